//! Mailman membership application: create missing lists and synchronize
//! members from the generated files.

use std::path::{Path, PathBuf};

use crate::config::MailingConfig;
use crate::exec::{self, ExecError};

/// Create the list if it does not exist yet, then synchronize its
/// membership file.
pub fn apply_conf(config: &MailingConfig, list: &str, file: &Path) -> Result<(), ExecError> {
    if !mailing_exists(config, list)? {
        create_mailing(config, list)?;
    }
    sync_members(config, list, file)
}

fn tool(config: &MailingConfig, name: &str) -> String {
    let home = config
        .mailman_home
        .clone()
        .unwrap_or_else(|| PathBuf::from("/var/lib/mailman"));
    home.join("bin").join(name).display().to_string()
}

fn mailing_exists(config: &MailingConfig, list: &str) -> Result<bool, ExecError> {
    // --bare prints list names only, one per line
    let out = exec::check_output(&[tool(config, "list_lists"), "--bare".to_string()])?;
    let wanted = list.to_lowercase();
    Ok(out.lines().any(|line| line.trim() == wanted))
}

fn create_mailing(config: &MailingConfig, list: &str) -> Result<(), ExecError> {
    exec::check_output(&[
        tool(config, "newlist"),
        "--automate".to_string(),
        "--quiet".to_string(),
        list.to_string(),
        config.admin.clone(),
        config.password.clone(),
    ])
    .map(|_| ())
}

fn sync_members(config: &MailingConfig, list: &str, file: &Path) -> Result<(), ExecError> {
    exec::check_output(&[
        tool(config, "sync_members"),
        "--welcome-msg=no".to_string(),
        "--goodbye-msg=no".to_string(),
        "--digest=no".to_string(),
        "--notifyadmin=no".to_string(),
        "--file".to_string(),
        file.display().to_string(),
        list.to_string(),
    ])
    .map(|_| ())
}
