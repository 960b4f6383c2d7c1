use std::io::Write;

use maplit::btreemap;
use pretty_assertions::assert_eq;
use tempfile;

use crate::conf::*;

fn load_conf(cont: &str) -> Result<(tempfile::NamedTempFile, ClusterInfo), ConfError> {
    let mut f = tempfile::NamedTempFile::new()?;
    f.write_all(cont.as_bytes()).unwrap();
    f.as_file().sync_all().unwrap();

    let ci = ClusterInfo::from_file(f.path())?;
    Ok((f, ci))
}

const HOSTS: &str = "
hosts:
    1:
        ring_addr: 127.0.0.1:4441
        udp_addr: 127.0.0.1:5551
    2:
        ring_addr: 127.0.0.1:4442
        udp_addr: 127.0.0.1:5552
    3:
        ring_addr: 192.168.0.1:4443
        udp_addr: 192.168.0.1:5553
";

#[test]
fn test_conf_serde_yaml() {
    let cont = format!(
        "{}
ring:
    ring_id: 7
    hosts: [2, 1, 3]
    master: 1
paxos:
    capacity: 128
    batch_size: 16
",
        HOSTS
    );

    let (_tmpf, ci) = load_conf(&cont).unwrap();
    let ring_addrs: std::collections::BTreeMap<_, _> =
        ci.hosts.iter().map(|(h, a)| (*h, a.ring_addr.to_string())).collect();
    assert_eq!(
        btreemap! {
            1 => "127.0.0.1:4441".to_string(),
            2 => "127.0.0.1:4442".to_string(),
            3 => "192.168.0.1:4443".to_string(),
        },
        ring_addrs
    );

    let h3 = ci.get_host(3).unwrap();
    assert_eq!(h3.ring_addr, "192.168.0.1:4443".parse().unwrap());
    assert_eq!(h3.udp_addr, "192.168.0.1:5553".parse().unwrap());
    assert!(ci.get_host(4).is_none());

    assert_eq!(
        RingConf {
            ring_id: 7,
            hosts: vec![2, 1, 3],
            master: 1,
        },
        ci.ring
    );

    assert_eq!(128, ci.paxos.capacity);
    assert_eq!(16, ci.paxos.batch_size);
    // defaults
    assert_eq!(256, ci.paxos.prepare_ahead);
    assert_eq!(1000, ci.paxos.reply_timeout_ms);
}

#[test]
fn test_conf_default_paxos() {
    let cont = format!("{}\nring: {{ring_id: 1, hosts: [1], master: 1}}\n", HOSTS);

    let (_f, ci) = load_conf(&cont).unwrap();
    assert_eq!(PaxosConf::default(), ci.paxos);
}

#[test]
fn test_conf_bad_ring() {
    let cases = vec![
        (
            "ring: {ring_id: 1, hosts: [1, 4], master: 1}",
            ConfError::OrphanHost(4),
        ),
        (
            "ring: {ring_id: 1, hosts: [1, 2, 1], master: 1}",
            ConfError::DupHost(1),
        ),
        (
            "ring: {ring_id: 1, hosts: [1, 2], master: 3}",
            ConfError::MasterNotOnRing(3),
        ),
        (
            "ring: {ring_id: 1, hosts: [], master: 1}",
            ConfError::EmptyRing(1),
        ),
        (
            "ring: {ring_id: 0, hosts: [1], master: 1}",
            ConfError::InvalidRingId(0),
        ),
        (
            "ring: {ring_id: 1, hosts: [1], master: 1}\npaxos: {batch_size: 0}",
            ConfError::InvalidParam("batch_size", 0),
        ),
    ];

    for (ring, want) in cases {
        let cont = format!("{}\n{}\n", HOSTS, ring);
        let rst = load_conf(&cont);
        assert_eq!(want, rst.err().unwrap(), "ring: {}", ring);
    }
}

#[test]
fn test_conf_host_id_too_large() {
    let cont = "
hosts:
    64: { ring_addr: 127.0.0.1:4441, udp_addr: 127.0.0.1:5551 }
ring: {ring_id: 1, hosts: [64], master: 64}
";
    let rst = load_conf(cont);
    assert_eq!(ConfError::HostIdTooLarge(64), rst.err().unwrap());
}

#[test]
fn test_conf_bad_file() {
    let rst = ClusterInfo::from_file("/no/such/file.yaml");
    assert!(matches!(rst, Err(ConfError::IOError(_))));

    let rst = load_conf("hosts: [");
    assert!(matches!(rst, Err(ConfError::BadYaml(_))));
}
