// SPDX-License-Identifier: Apache-2.0

//! The grow-and-retry contract: a buffer of any size either completes
//! the document or reports exhaustion, and a later attempt with enough
//! room produces exactly the nodes a roomy first attempt would have.

use flatjson::{FlatDoc, Node, ParseStatus, Parser};

const DOCUMENT: &str = r#"{"tags": ["a", "b"], "deep": {"x": [0x3f800000, false]}, "n": -4}"#;

fn reference_parse(input: &str) -> Vec<Node<'_>> {
    let mut nodes = vec![Node::default(); 128];
    let mut parser = Parser::new(input);
    assert_eq!(parser.parse(&mut nodes), ParseStatus::Valid);
    nodes.truncate(parser.node_count());
    nodes
}

#[test]
fn every_short_buffer_reports_exhaustion() {
    let reference = reference_parse(DOCUMENT);
    for capacity in 0..reference.len() {
        let mut nodes = vec![Node::default(); capacity];
        let mut parser = Parser::new(DOCUMENT);
        assert_eq!(
            parser.parse(&mut nodes),
            ParseStatus::CapacityExceeded,
            "capacity {}",
            capacity
        );
        assert!(
            parser.error_message().contains("node buffer capacity exceeded"),
            "capacity {}",
            capacity
        );
    }
}

#[test]
fn the_exact_capacity_suffices() {
    let reference = reference_parse(DOCUMENT);
    let mut nodes = vec![Node::default(); reference.len()];
    let mut parser = Parser::new(DOCUMENT);
    assert_eq!(parser.parse(&mut nodes), ParseStatus::Valid);
    assert_eq!(parser.node_count(), reference.len());
}

#[test]
fn doubling_retry_converges_to_identical_content() {
    let reference = reference_parse(DOCUMENT);

    let mut parser = Parser::new(DOCUMENT);
    let mut capacity = 1;
    let nodes = loop {
        let mut nodes = vec![Node::default(); capacity];
        match parser.parse(&mut nodes) {
            ParseStatus::Valid => {
                nodes.truncate(parser.node_count());
                break nodes;
            }
            ParseStatus::CapacityExceeded => capacity *= 2,
            status => panic!("unexpected status {:?}", status),
        }
    };

    assert_eq!(nodes, reference);
}

#[test]
fn failed_attempts_leave_no_stale_diagnostics() {
    let mut parser = Parser::new(DOCUMENT);
    let mut nodes = vec![Node::default(); 3];
    assert_eq!(parser.parse(&mut nodes), ParseStatus::CapacityExceeded);
    assert!(!parser.error_message().is_empty());

    let mut nodes = vec![Node::default(); 128];
    assert_eq!(parser.parse(&mut nodes), ParseStatus::Valid);
    assert_eq!(parser.error_message(), "");
}

#[test]
fn capacity_overrides_a_syntax_error_mid_push() {
    // The error marker itself no longer fits, so exhaustion wins and no
    // context window is attached.
    let mut nodes = [Node::default(); 2];
    let mut parser = Parser::new("[1,]");
    assert_eq!(parser.parse(&mut nodes), ParseStatus::CapacityExceeded);
    let message = parser.error_message();
    assert!(message.contains("value expected"), "got {:?}", message);
    assert!(message.contains("capacity exceeded"), "got {:?}", message);
    assert!(!message.contains(">>>"), "got {:?}", message);
}

#[test]
fn flat_doc_retries_with_a_bigger_type() {
    let mut small: FlatDoc<4> = FlatDoc::new();
    let mut parser = Parser::new(DOCUMENT);
    assert_eq!(parser.parse_doc(&mut small), ParseStatus::CapacityExceeded);
    assert_eq!(small.len(), 4);

    let mut big: FlatDoc<64> = FlatDoc::new();
    assert_eq!(parser.parse_doc(&mut big), ParseStatus::Valid);
    assert_eq!(big.nodes(), &reference_parse(DOCUMENT)[..]);
}
