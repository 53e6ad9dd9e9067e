use eml_json_extract::*;

// --- anchor scanning ---

#[test]
fn test_anchor_hrefs_document_order() {
    let html = r#"<html><body>
        <p>Intro <a href="https://a.example/one">one</a></p>
        <A HREF='https://b.example/two.json'>two</A>
        <a class=x href=https://c.example/three>three</a>
    </body></html>"#;

    let hrefs = anchor_hrefs(html);

    assert_eq!(
        hrefs,
        vec![
            LinkCandidate::new("https://a.example/one"),
            LinkCandidate::new("https://b.example/two.json"),
            LinkCandidate::new("https://c.example/three"),
        ]
    );
}

#[test]
fn test_anchor_hrefs_skips_non_anchor_tags() {
    let html = r#"<link href="style.json"><abbr href="x.json">x</abbr><area href="y.json">"#;

    assert!(anchor_hrefs(html).is_empty());
}

#[test]
fn test_anchor_hrefs_ignores_comments_and_scripts() {
    let html = r#"<!-- <a href="hidden.json">x</a> -->
        <script>var s = '<a href="script.json">';</script>
        <a href="visible.json">v</a>"#;

    assert_eq!(anchor_hrefs(html), vec![LinkCandidate::new("visible.json")]);
}

#[test]
fn test_anchor_without_href_is_skipped() {
    let html = r#"<a name="top"></a><a href="">empty</a><a data-href="x.json">x</a>"#;

    assert!(anchor_hrefs(html).is_empty());
}

#[test]
fn test_apostrophe_in_unquoted_value_is_text() {
    let html = r#"<img alt=Bob's src=x.png><a href="https://x.example/d.json">x</a>"#;

    assert_eq!(
        anchor_hrefs(html),
        vec![LinkCandidate::new("https://x.example/d.json")]
    );
}

#[test]
fn test_href_text_inside_other_attribute_is_ignored() {
    let html = r#"<a title="see href=https://x/other.json" href="https://x.example/d.json">x</a>"#;

    assert_eq!(
        anchor_hrefs(html),
        vec![LinkCandidate::new("https://x.example/d.json")]
    );
}

#[test]
fn test_first_duplicate_href_wins() {
    let html = r#"<a href = 'first.json' HREF="second.json">x</a>"#;

    assert_eq!(anchor_hrefs(html), vec![LinkCandidate::new("first.json")]);
}

#[test]
fn test_malformed_html_does_not_panic() {
    let cases = [
        "",
        "<",
        "<a",
        "<a href=\"https://x.example/data.json",
        "<<<>>>",
        "<!-- never closed <a href='a.json'>",
        "<script><a href='a.json'>",
        "<div><p>unclosed <a href='https://x.example/ok.json'>link",
        "<a href='one.json'><a href='two.json'",
        "\u{feff}<a href=\"é.json\">ünïcode</a>",
    ];

    for html in cases {
        let _ = anchor_hrefs(html);
        let _ = LinkMatcher::default().find_link(html);
    }

    assert!(anchor_hrefs("<a href=\"https://x.example/data.json").is_empty());
    assert_eq!(
        anchor_hrefs("<div><p>unclosed <a href='https://x.example/ok.json'>link"),
        vec![LinkCandidate::new("https://x.example/ok.json")]
    );
    assert_eq!(
        anchor_hrefs("<a href='one.json'><a href='two.json'"),
        vec![LinkCandidate::new("one.json")]
    );
}

// --- pattern A: .json suffix ---

#[test]
fn test_json_suffix_ignores_query_and_fragment() {
    assert!(has_json_suffix("https://cdn.example.com/export/data.json"));
    assert!(has_json_suffix("https://cdn.example.com/data.json?token=abc"));
    assert!(has_json_suffix("https://cdn.example.com/data.json#top"));
    assert!(has_json_suffix("relative/data.json"));
    assert!(!has_json_suffix("https://cdn.example.com/data.jsonl"));
    assert!(!has_json_suffix("https://cdn.example.com/?file=data.json"));
    assert!(!has_json_suffix("https://cdn.example.com/data.json/view"));
}

// --- pattern B: cloud "file view" ---

#[test]
fn test_drive_link_shape() {
    let matcher = LinkMatcher::new(LinkPattern::DriveView);

    let link = matcher
        .drive_link("https://drive.google.com/file/d/1AbC_d-9/view?usp=sharing")
        .unwrap();
    assert_eq!(link.file_id, "1AbC_d-9");
    assert_eq!(link.authority, "drive.google.com");

    assert!(matcher.drive_link("https://drive.google.com/file/d/ABC/view#x").is_some());
    assert!(matcher.drive_link("https://drive.google.com/file/d/ABC/edit").is_none());
    assert!(matcher.drive_link("https://drive.google.com/file/d//view").is_none());
    assert!(matcher.drive_link("https://evil.example/file/d/ABC/view").is_none());
    assert!(matcher.drive_link("ftp://drive.google.com/file/d/ABC/view").is_none());
}

#[test]
fn test_normalize_drive_view_link() {
    let matcher = LinkMatcher::default();

    assert_eq!(
        matcher.normalize("https://drive.google.com/file/d/ABC123/view"),
        "https://drive.google.com/uc?id=ABC123&export=download"
    );
    assert_eq!(
        matcher.normalize("https://drive.google.com/file/d/ABC123/view?usp=sharing"),
        "https://drive.google.com/uc?id=ABC123&export=download"
    );
}

#[test]
fn test_normalize_leaves_other_links() {
    let matcher = LinkMatcher::default();

    assert_eq!(
        matcher.normalize("https://cdn.example.com/data.json"),
        "https://cdn.example.com/data.json"
    );
}

#[test]
fn test_drive_hosts_are_configurable() {
    let matcher = LinkMatcher::new(LinkPattern::DriveView).with_drive_hosts(["Files.Example.org"]);

    assert!(matcher.matches("https://files.example.org/file/d/XYZ/view"));
    assert!(!matcher.matches("https://drive.google.com/file/d/XYZ/view"));
}

// --- pattern selection ---

#[test]
fn test_pattern_selection() {
    let suffix = LinkMatcher::new(LinkPattern::JsonSuffix);
    let drive = LinkMatcher::new(LinkPattern::DriveView);
    let either = LinkMatcher::new(LinkPattern::Either);
    let json_url = "https://cdn.example.com/data.json";
    let view_url = "https://drive.google.com/file/d/ABC/view";

    assert!(suffix.matches(json_url));
    assert!(!suffix.matches(view_url));
    assert!(!drive.matches(json_url));
    assert!(drive.matches(view_url));
    assert!(either.matches(json_url));
    assert!(either.matches(view_url));
}

#[test]
fn test_find_link_first_match_wins() {
    let html = r#"
        <a href="https://example.com/about">About</a>
        <a href="https://drive.google.com/file/d/FIRST/view">Drive</a>
        <a href="https://cdn.example.com/second.json">JSON</a>
    "#;

    assert_eq!(
        LinkMatcher::new(LinkPattern::Either).find_link(html),
        Some(LinkCandidate::new("https://drive.google.com/file/d/FIRST/view"))
    );
    assert_eq!(
        LinkMatcher::new(LinkPattern::JsonSuffix).find_link(html),
        Some(LinkCandidate::new("https://cdn.example.com/second.json"))
    );
    assert_eq!(LinkMatcher::default().find_link("<p>no links</p>"), None);
}

#[test]
fn test_link_pattern_from_str() {
    assert_eq!("json-suffix".parse(), Ok(LinkPattern::JsonSuffix));
    assert_eq!("Drive-View".parse(), Ok(LinkPattern::DriveView));
    assert_eq!("either".parse(), Ok(LinkPattern::Either));
    assert!("regex".parse::<LinkPattern>().is_err());
    assert_eq!(LinkPattern::DriveView.to_string(), "drive-view");
}
