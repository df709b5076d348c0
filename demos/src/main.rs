// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::fs;
use std::process;

use flatjson::{Node, ParseStatus, Parser};

const SAMPLE: &str = r#"[
    null,
    {"x": 1.5, "y": ["Test", 0x4048f5c3]},
    [1, -9223372036854775808]
]"#;

fn main() {
    env_logger::init();

    let args: Vec<_> = env::args().collect();
    let text = match args.get(1) {
        Some(path) => match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("Error: Unable to read file '{}': {}", path, e);
                process::exit(1);
            }
        },
        None => {
            println!("No file given, parsing the built-in sample.");
            SAMPLE.to_string()
        }
    };

    // Start small and let the parser tell us when the buffer is short.
    let mut nodes = vec![Node::default(); 4];
    let mut parser = Parser::new(&text);
    loop {
        match parser.parse(&mut nodes) {
            ParseStatus::Valid => break,
            ParseStatus::CapacityExceeded => {
                let grown = nodes.len() * 2;
                println!("{} nodes were not enough, retrying with {}", nodes.len(), grown);
                nodes = vec![Node::default(); grown];
            }
            status => {
                eprintln!("Error: parse failed with {:?}", status);
                eprint!("{}", parser.error_message());
                process::exit(1);
            }
        }
    }

    println!("parsed into {} nodes:", parser.node_count());
    for (index, node) in nodes[..parser.node_count()].iter().enumerate() {
        match node.successor() {
            Some(successor) => println!("{:3}  {}  (next: {})", index, node, successor),
            None => println!("{:3}  {}", index, node),
        }
    }

    if args.len() < 2 {
        query_sample(&nodes[..parser.node_count()]);
    }
}

/// Path lookups against the built-in sample document.
fn query_sample(nodes: &[Node<'_>]) {
    println!();

    if let Some(found) = flatjson::resolve(nodes, "[1].y[1]") {
        println!("[1].y[1]     = {:?}", found.as_f32());
    }
    if let Some(found) = flatjson::resolve(nodes, "[2][-1]") {
        println!("[2][-1]      = {:?}", found.as_i64());
    }
    if let Some(found) = flatjson::resolve(nodes, "[1].y[0]") {
        let mut buf = [0u8; 32];
        if let Some(written) = found.decode_string_into(&mut buf) {
            println!(
                "[1].y[0]     = {:?}",
                std::str::from_utf8(&buf[..written]).unwrap_or("<bad utf8>")
            );
        }
    }

    // Walk the object's members through the key chain.
    if let Some(object) = flatjson::resolve(nodes, "[1]") {
        println!("[1] has {} members:", object.count());
        for key in object.children() {
            match key.value() {
                Some(value) => println!("    {} -> {}", key.node(), value.node()),
                None => println!("    {}", key.node()),
            }
        }
    }
}
