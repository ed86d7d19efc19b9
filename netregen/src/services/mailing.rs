//! Mailing-list membership file regeneration.

use std::collections::BTreeMap;

use log::warn;

use crate::client::AuthClient;
use crate::config::Config;
use crate::error::ServiceError;
use crate::fetch::Fetcher;
use crate::output::write_artifact;
use crate::progress::{Progress, Status};

use super::mailman;

/// The three kinds of membership files, each with its own file-name prefix
/// and member endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ListKind {
    Standard,
    Club,
    ClubAdmin,
}

impl ListKind {
    fn file_prefix(self) -> &'static str {
        match self {
            ListKind::Standard => "ml_std",
            ListKind::Club => "ml_club",
            ListKind::ClubAdmin => "ml_club_admin",
        }
    }

    fn member_endpoint(self, name: &str) -> String {
        match self {
            ListKind::Standard => format!("ml/std/member/{name}"),
            ListKind::Club => format!("ml/club/member/{name}"),
            ListKind::ClubAdmin => format!("ml/club/admin/{name}"),
        }
    }

    /// Name under which the list is applied to the membership manager.
    fn applied_name(self, name: &str) -> String {
        match self {
            ListKind::Standard | ListKind::Club => name.to_string(),
            ListKind::ClubAdmin => format!("{name}-admin"),
        }
    }
}

/// Regenerate every managed membership file, then apply them through the
/// configured manager. Per-list failures are recorded and skip only that
/// list.
pub fn regen(config: &Config, client: &mut AuthClient, progress: Progress) -> Vec<ServiceError> {
    let mut errors = Vec::new();
    let mut fetcher = Fetcher::new(client, &config.server);

    progress.step("Fetching mailing lists", Status::Running);
    let std_names = match fetcher.standard_mailing_lists() {
        Ok(lists) => lists
            .into_iter()
            .filter(|l| config.mailing.allows(&l.name))
            .map(|l| l.name)
            .collect::<Vec<_>>(),
        Err(source) => {
            errors.push(ServiceError::Fetch {
                what: "standard mailing lists",
                source,
            });
            Vec::new()
        }
    };
    let club_names = match fetcher.club_mailing_lists() {
        Ok(lists) => lists
            .into_iter()
            .filter(|l| config.mailing.allows(&l.name))
            .map(|l| l.name)
            .collect::<Vec<_>>(),
        Err(source) => {
            errors.push(ServiceError::Fetch {
                what: "club mailing lists",
                source,
            });
            Vec::new()
        }
    };
    progress.step(
        "Fetching mailing lists",
        if errors.is_empty() {
            Status::Ok
        } else {
            Status::Error
        },
    );

    // kind -> list name -> membership file body
    let mut files: BTreeMap<(ListKind, String), String> = BTreeMap::new();
    let mut memberships = Vec::new();
    for name in &std_names {
        memberships.push((ListKind::Standard, name.clone()));
    }
    for name in &club_names {
        memberships.push((ListKind::Club, name.clone()));
        memberships.push((ListKind::ClubAdmin, name.clone()));
    }

    for (kind, name) in &memberships {
        match fetcher.mailing_members(&kind.member_endpoint(name)) {
            Ok(emails) => {
                let mut body = emails.join("\n");
                body.push('\n');
                files.insert((*kind, name.clone()), body);
            }
            Err(source) => {
                warn!("skipping {} {name}: could not fetch members", kind.file_prefix());
                errors.push(ServiceError::Fetch {
                    what: "mailing-list members",
                    source,
                });
            }
        }
    }

    let mut applied = Vec::new();
    for ((kind, name), body) in &files {
        let file_name = format!("{}_{}.list", kind.file_prefix(), name);
        match write_artifact(&config.output.dir, &file_name, body) {
            Ok(path) => applied.push((kind.applied_name(name), path)),
            Err(source) => errors.push(ServiceError::Write {
                path: config.output.dir.join(file_name),
                source,
            }),
        }
    }

    if config.mailing.manager.as_deref() == Some("mailman") {
        for (list, path) in &applied {
            let label = format!("Syncing list {list}");
            progress.step(&label, Status::Running);
            match mailman::apply_conf(&config.mailing, list, path) {
                Ok(()) => progress.step(&label, Status::Ok),
                Err(source) => {
                    progress.step(&label, Status::Error);
                    errors.push(ServiceError::Apply {
                        what: format!("mailing list {list}"),
                        source,
                    });
                }
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::ListKind;

    #[test]
    fn member_endpoints_match_the_directory_layout() {
        assert_eq!(
            ListKind::Standard.member_endpoint("members"),
            "ml/std/member/members"
        );
        assert_eq!(ListKind::Club.member_endpoint("chess"), "ml/club/member/chess");
        assert_eq!(
            ListKind::ClubAdmin.member_endpoint("chess"),
            "ml/club/admin/chess"
        );
    }

    #[test]
    fn admin_lists_apply_under_a_suffixed_name() {
        assert_eq!(ListKind::ClubAdmin.applied_name("chess"), "chess-admin");
        assert_eq!(ListKind::Club.applied_name("chess"), "chess");
    }
}
