//! End-to-end rendering scenario: one `/32` extension with a single host.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use zonegen_core::{
    partition, render_forward, render_reverse, Extension, HostRecord, Ipv4Assignment, NsRecord,
    SoaMeta, ZoneData, ZoneMeta, ZoneSerial,
};

fn sample() -> ZoneData {
    ZoneData {
        hosts: vec![HostRecord {
            domain: "srv".to_string(),
            extension: ".test".to_string(),
            mac_address: "AA:BB:CC:DD:EE:FF".to_string(),
            ipv4: Ipv4Assignment {
                ipv4: "10.69.0.1".to_string(),
                ip_type: "srv".to_string(),
            },
            ipv6: Vec::new(),
        }],
        extensions: vec![Extension {
            extension: ".test".to_string(),
            ip_type: "srv".to_string(),
            domaine_ip_start: "10.69.0.1".to_string(),
            domaine_ip_stop: "10.69.0.1".to_string(),
        }],
        zones: vec![ZoneMeta {
            name: ".test".to_string(),
            soa: SoaMeta {
                mail: "root.test.".to_string(),
                param: "    3600 900 604800 86400".to_string(),
            },
            zone_entry: "@               IN  A       10.69.0.1".to_string(),
        }],
        ns: vec![NsRecord {
            zone: ".test".to_string(),
            ns_entry: "@               IN  NS      ns.test".to_string(),
        }],
        ..ZoneData::default()
    }
}

fn serial() -> ZoneSerial {
    ZoneSerial::from_datetime(
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .expect("date")
            .and_hms_opt(10, 0, 0)
            .expect("time"),
    )
}

#[test]
fn forward_zone_carries_the_host_a_record() {
    let data = sample();
    let text = render_forward(".test", &data, &serial()).expect("render forward");
    assert!(text.contains("srv             IN  A       10.69.0.1\n"));
}

#[test]
fn single_address_range_becomes_a_host_reverse_zone() {
    let data = sample();
    let groups = partition(&data.extensions).expect("partition");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].network.to_string(), "10.69.0.1/32");

    let zone = render_reverse(&groups[0], &data, &serial()).expect("render reverse");
    assert_eq!(zone.key, "10.69.0.1");
    assert!(zone.text.contains("        IN  PTR     srv.test.\n"));
}

#[test]
fn forward_and_reverse_share_the_run_serial() {
    let data = sample();
    let serial = serial();
    let forward = render_forward(".test", &data, &serial).expect("render forward");
    let groups = partition(&data.extensions).expect("partition");
    let reverse = render_reverse(&groups[0], &data, &serial).expect("render reverse");

    let field = format!("    {}; serial", serial.padded());
    assert!(forward.contains(&field));
    assert!(reverse.text.contains(&field));
}
