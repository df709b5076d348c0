// SPDX-License-Identifier: Apache-2.0

//! UTF-16 surrogate pair handling end to end: pairs must combine into
//! one supplementary character, halves on their own must be rejected at
//! the lexical stage.

use flatjson::{resolve, Node, ParseStatus, Parser};

fn parse(input: &str) -> (ParseStatus, Vec<Node<'_>>, usize) {
    let mut nodes = vec![Node::default(); 32];
    let mut parser = Parser::new(input);
    let status = parser.parse(&mut nodes);
    let count = parser.node_count();
    (status, nodes, count)
}

fn decoded(node: &Node<'_>) -> String {
    let mut buf = [0u8; 64];
    let written = node.decode_string_into(&mut buf).expect("string node");
    core::str::from_utf8(&buf[..written])
        .expect("valid utf8")
        .to_string()
}

#[test]
fn pair_combines_into_one_character() {
    // U+1D11E musical G clef.
    let (status, nodes, _) = parse(r#"["\uD834\uDD1E"]"#);
    assert_eq!(status, ParseStatus::Valid);
    assert_eq!(decoded(&nodes[1]), "\u{1D11E}");
    assert_eq!(nodes[1].string_decoded_len(), Some(4));
}

#[test]
fn pair_works_in_key_position() {
    let (status, nodes, _) = parse(r#"{"\uD83D\uDE00": 1}"#);
    assert_eq!(status, ParseStatus::Valid);
    assert!(nodes[1].is_key());
    assert_eq!(decoded(&nodes[1]), "\u{1F600}");
}

#[test]
fn pairs_mix_with_other_content() {
    let (status, nodes, _) = parse(r#"["ab\uD834\uDD1Ecd \u0041"]"#);
    assert_eq!(status, ParseStatus::Valid);
    assert_eq!(decoded(&nodes[1]), "ab\u{1D11E}cd A");

    let chars: Vec<char> = nodes[1].string_chars().unwrap().collect();
    assert_eq!(chars.len(), 7);
    assert_eq!(chars[2], '\u{1D11E}');
}

#[test]
fn supplementary_characters_may_also_come_raw() {
    let raw = "[\"\u{1D11E}\"]";
    let (status, nodes, _) = parse(raw);
    assert_eq!(status, ParseStatus::Valid);
    assert_eq!(decoded(&nodes[1]), "\u{1D11E}");
}

#[test]
fn lone_high_half_is_rejected() {
    let (status, _, _) = parse(r#"["\uD834"]"#);
    assert_eq!(status, ParseStatus::InvalidTokens);
}

#[test]
fn lone_low_half_is_rejected() {
    let (status, _, _) = parse(r#"["\uDD1E"]"#);
    assert_eq!(status, ParseStatus::InvalidTokens);
}

#[test]
fn reversed_pair_is_rejected() {
    let (status, _, _) = parse(r#"["\uDD1E\uD834"]"#);
    assert_eq!(status, ParseStatus::InvalidTokens);
}

#[test]
fn high_half_followed_by_bmp_escape_is_rejected() {
    let (status, _, _) = parse(r#"["\uD834\u0041"]"#);
    assert_eq!(status, ParseStatus::InvalidTokens);
}

#[test]
fn high_half_followed_by_raw_text_is_rejected() {
    let (status, _, _) = parse(r#"["\uD834 x"]"#);
    assert_eq!(status, ParseStatus::InvalidTokens);
}

#[test]
fn decoded_strings_resolve_through_paths() {
    let (status, nodes, count) = parse(r#"{"emoji": "\uD83D\uDE00!"}"#);
    assert_eq!(status, ParseStatus::Valid);
    let node = resolve(&nodes[..count], ".emoji").expect("member");
    assert_eq!(node.string_decoded_len(), Some(5));
    assert_eq!(decoded(&node), "\u{1F600}!");
}
