use super::*;

const MASTER: &str = r#"<?xml version="1.0"?>
<gameList>
	<provider>
		<System>Nintendo Switch</System>
		<software>ES-DE</software>
	</provider>
	<game>
		<path>./Celeste.xci</path>
		<name>Celeste</name>
		<desc>Climb &amp; conquer</desc>
		<image>./downloaded_media/switch/covers/Celeste.png</image>
	</game>
	<game id="42">
		<path>./sub/Hades.nsp</path>
		<name><![CDATA[Hades <Deluxe>]]></name>
	</game>
	<game>
		<name>No path here</name>
	</game>
	<game>
		<path>./Tunic.xci</path>
		<name></name>
		<favorite/>
	</game>
</gameList>
"#;

#[test]
fn test_escape_xml() {
    assert_eq!(escape_xml("Tom & Jerry"), "Tom &amp; Jerry");
    assert_eq!(escape_xml("a < b"), "a &lt; b");
}

#[test]
fn test_stem_from_path() {
    assert_eq!(stem_from_path("./Celeste.xci").as_deref(), Some("Celeste"));
    assert_eq!(stem_from_path(" ./sub/dir/Hades.nsp ").as_deref(), Some("Hades"));
    assert_eq!(stem_from_path(".\\win\\Game (USA).zip").as_deref(), Some("Game (USA)"));
    assert_eq!(stem_from_path("./Folder").as_deref(), Some("Folder"));
    assert_eq!(stem_from_path("./"), None);
    assert_eq!(stem_from_path(""), None);
}

#[test]
fn test_parse_entries_in_document_order() {
    let gamelist = parse_gamelist(MASTER, "switch").unwrap();
    let stems: Vec<&str> = gamelist.entries.iter().map(|e| e.stem.as_str()).collect();
    assert_eq!(stems, vec!["Celeste", "Hades", "Tunic"]);
    assert_eq!(gamelist.skipped_records, 1);
    assert_eq!(gamelist.total_records(), 4);
}

#[test]
fn test_parse_fields_and_names() {
    let gamelist = parse_gamelist(MASTER, "switch").unwrap();
    let celeste = &gamelist.entries[0];
    assert_eq!(celeste.system, "switch");
    assert_eq!(celeste.display_name, "Celeste");
    assert_eq!(celeste.field("desc"), Some("Climb & conquer"));
    assert_eq!(
        celeste.field("image"),
        Some("./downloaded_media/switch/covers/Celeste.png")
    );

    assert_eq!(gamelist.entries[1].display_name, "Hades <Deluxe>");
    // Empty name falls back to the stem
    assert_eq!(gamelist.entries[2].display_name, "Tunic");
    assert_eq!(gamelist.entries[2].field("favorite"), Some(""));
}

#[test]
fn test_parse_keeps_raw_records() {
    let gamelist = parse_gamelist(MASTER, "switch").unwrap();
    let provider = gamelist.provider.as_deref().unwrap();
    assert!(provider.starts_with("<provider>"));
    assert!(provider.ends_with("</provider>"));

    let hades = gamelist.entries[1].raw_record.as_deref().unwrap();
    assert!(hades.starts_with("<game id=\"42\">"));
    assert!(hades.contains("<![CDATA[Hades <Deluxe>]]>"));
    assert!(hades.ends_with("</game>"));

    let celeste = gamelist.entries[0].raw_record.as_deref().unwrap();
    assert!(celeste.contains("Climb &amp; conquer"));
}

#[test]
fn test_render_filtered_subset() {
    let gamelist = parse_gamelist(MASTER, "switch").unwrap();
    let kept = vec![&gamelist.entries[0], &gamelist.entries[2]];
    let xml = render_gamelist(gamelist.provider.as_deref(), &kept);

    assert!(xml.starts_with("<?xml version=\"1.0\"?>\n<gameList>\n"));
    assert!(xml.ends_with("</gameList>\n"));
    assert!(xml.contains("<System>Nintendo Switch</System>"));
    assert!(!xml.contains("Hades"));

    let reparsed = parse_gamelist(&xml, "switch").unwrap();
    let stems: Vec<&str> = reparsed.entries.iter().map(|e| e.stem.as_str()).collect();
    assert_eq!(stems, vec!["Celeste", "Tunic"]);
    assert_eq!(reparsed.entries[0].raw_record, gamelist.entries[0].raw_record);
    assert_eq!(reparsed.provider, gamelist.provider);
}

#[test]
fn test_render_entry_without_raw_record() {
    let entry = CatalogEntry::new("snes", "Tom & Jerry")
        .with_field("path", "./Tom & Jerry.sfc");
    let xml = render_gamelist(None, &[&entry]);
    assert!(xml.contains("<name>Tom &amp; Jerry</name>"));
    assert!(xml.contains("<path>./Tom &amp; Jerry.sfc</path>"));

    let reparsed = parse_gamelist(&xml, "snes").unwrap();
    assert_eq!(reparsed.entries[0].stem, "Tom & Jerry");
}

#[test]
fn test_parse_rejects_missing_root() {
    let err = parse_gamelist("<?xml version=\"1.0\"?>\n<games></games>", "snes").unwrap_err();
    assert!(matches!(err, FrontendError::InvalidGamelist(_)));
}

#[test]
fn test_parse_rejects_malformed_xml() {
    let err = parse_gamelist("<gameList><game><path>./a.sfc</game></gameList>", "snes").unwrap_err();
    assert!(matches!(err, FrontendError::XmlParse(_)));
}

#[test]
fn test_parse_rejects_truncated_document() {
    assert!(parse_gamelist("<gameList><game><path>./a.sfc</path>", "snes").is_err());
}

#[test]
fn test_empty_gamelist() {
    let gamelist = parse_gamelist("<gameList/>", "snes").unwrap();
    assert!(gamelist.entries.is_empty());
    assert!(gamelist.provider.is_none());
}

#[test]
fn test_read_catalog_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gamelist.xml");
    std::fs::write(&path, MASTER).unwrap();

    let esde = EsDeFrontend::new();
    let frontend: &dyn Frontend = &esde;
    let gamelist = frontend.read_catalog(&path, "switch").unwrap();
    assert_eq!(gamelist.entries.len(), 3);

    let kept: Vec<&CatalogEntry> = gamelist.entries.iter().take(1).collect();
    let rendered = frontend.render_catalog(gamelist.provider.as_deref(), &kept);
    let reread = parse_gamelist(&rendered, "switch").unwrap();
    assert_eq!(reread.entries[..], gamelist.entries[..1]);
    assert_eq!(reread.provider, gamelist.provider);

    let missing = frontend.read_catalog(&dir.path().join("nope.xml"), "switch");
    assert!(matches!(missing, Err(FrontendError::Io(_))));
}
