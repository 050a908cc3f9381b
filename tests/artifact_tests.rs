use ratatoskr::dns::enums::DNSResourceType;
use ratatoskr::dnssec::records::Nsec3Record;
use ratatoskr::walk::artifacts::{ExportLine, HashExport, MapArtifact};

fn sample_record(owner_hash: &str) -> Nsec3Record {
    Nsec3Record {
        owner_hash: owner_hash.to_string(),
        next_hash: "2t7b4g4vsa5smi47k61mv5bv1a22bojr".to_string(),
        algorithm: 1,
        iterations: 12,
        salt: "aabbccdd".to_string(),
        types: vec![DNSResourceType::A, DNSResourceType::RRSIG],
    }
}

#[test]
fn test_hash_export_appends_crackable_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nsec3.hashes");

    let export = HashExport::create(&path, "example.com.").unwrap();
    export
        .append(&sample_record("0p9mhaveqvm6t7vbl5lop2u3t2rp3tom"))
        .unwrap();
    export
        .append(&sample_record("35mthgpgcu1qg68fab165klnsnk3dpvl"))
        .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "0p9mhaveqvm6t7vbl5lop2u3t2rp3tom:.example.com:AABBCCDD:12"
    );

    let parsed = ExportLine::parse(lines[1]).unwrap();
    assert_eq!(parsed.hash, "35mthgpgcu1qg68fab165klnsnk3dpvl");
    assert_eq!(parsed.zone, "example.com");
}

#[test]
fn test_hash_export_truncates_stale_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nsec3.hashes");
    std::fs::write(&path, "stale line from a previous run\n").unwrap();

    let export = HashExport::create(&path, "example.com").unwrap();
    export
        .append(&sample_record("0p9mhaveqvm6t7vbl5lop2u3t2rp3tom"))
        .unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(!content.contains("stale"));
}

#[test]
fn test_map_artifact_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nsec3.map");

    let mut map = MapArtifact::new("example.com");
    map.insert(
        "0p9mhaveqvm6t7vbl5lop2u3t2rp3tom",
        &[DNSResourceType::A, DNSResourceType::MX, DNSResourceType::RRSIG],
    );
    map.insert("35mthgpgcu1qg68fab165klnsnk3dpvl", &[DNSResourceType::TXT]);
    map.save(&path).unwrap();

    let loaded = MapArtifact::load(&path).unwrap();
    assert_eq!(loaded, map);
    assert_eq!(
        loaded.types_for("0P9MHAVEQVM6T7VBL5LOP2U3T2RP3TOM"),
        Some(vec![
            DNSResourceType::A,
            DNSResourceType::MX,
            DNSResourceType::RRSIG,
        ])
    );
}

#[test]
fn test_map_artifact_rejects_unknown_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nsec3.map");
    std::fs::write(
        &path,
        r#"{"version": 99, "zone": "example.com", "records": {}}"#,
    )
    .unwrap();

    assert!(MapArtifact::load(&path).is_err());
}

#[test]
fn test_map_artifact_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nsec3.map");
    std::fs::write(&path, "{'not': 'json, this was eval once'}").unwrap();

    assert!(MapArtifact::load(&path).is_err());
}
