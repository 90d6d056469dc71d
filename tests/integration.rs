use shlower::Error;
use shlower::ir::{ChannelId, Endpoint, Fragment, FragmentNode, Lowered, Tree, render};
use shlower::lower::LowerOptions;
use shlower::parse::ArgChar;

// ── Dialect builders ──

fn word(text: &str) -> String {
    let chars: Vec<String> = text
        .chars()
        .map(|c| format!("<\"C\":{}>", c as u32))
        .collect();
    format!("({})", chars.join(","))
}

fn words(ws: &[&str]) -> String {
    let ws: Vec<String> = ws.iter().map(|w| word(w)).collect();
    format!("({})", ws.join(","))
}

fn command(line: u32, ws: &[&str]) -> String {
    format!("<\"Command\":({line},(),{},())>", words(ws))
}

fn assign(line: u32, name: &str, value: &str) -> String {
    format!("<\"Command\":({line},((\"{name}\",{})),(),())>", word(value))
}

fn pipe(items: &[String]) -> String {
    format!("<\"Pipe\":(false,({}))>", items.join(","))
}

fn binary(construct: &str, l: &str, r: &str) -> String {
    format!("<\"{construct}\":({l},{r})>")
}

fn wrapper(construct: &str, line: u32, node: &str, redirs: &str) -> String {
    format!("<\"{construct}\":({line},{node},({redirs}))>")
}

fn output_redirect(target: &str) -> String {
    format!("<\"File\":(<\"To\">,1,{})>", word(target))
}

// ── Result helpers ──

fn lower_one(text: &str) -> Lowered {
    let mut lowered = shlower::lower_str(text).expect("lowering should succeed");
    assert_eq!(lowered.len(), 1, "expected a single top-level node");
    lowered.remove(0)
}

fn fragment(lowered: &Lowered) -> &Fragment {
    lowered.as_fragment().expect("expected a fragment")
}

fn stage_names(f: &Fragment) -> Vec<String> {
    f.stages()
        .map(|s| s.name.as_literal().unwrap_or_default())
        .collect()
}

/// Every channel bound by a stage, in tree order.
fn stage_channels(lowered: &Lowered, out: &mut Vec<(ChannelId, ChannelId)>) {
    match lowered {
        Lowered::Fragment(f) => {
            for node in f.nodes() {
                match node {
                    FragmentNode::Stage(s) => {
                        for arg in std::iter::once(&s.name).chain(&s.options) {
                            for c in arg.chars() {
                                if let ArgChar::Subst(inner) = c {
                                    stage_channels(inner, out);
                                }
                            }
                        }
                        out.push((s.input, s.output));
                    }
                    FragmentNode::Opaque(t) => tree_channels(t, out),
                }
            }
        }
        Lowered::Tree(t) => tree_channels(t, out),
    }
}

fn tree_channels(tree: &Tree, out: &mut Vec<(ChannelId, ChannelId)>) {
    match tree {
        Tree::And(l, r) | Tree::Or(l, r) | Tree::Semi(l, r) => {
            stage_channels(l, out);
            stage_channels(r, out);
        }
        Tree::Redir { node, .. } | Tree::Subshell { node, .. } => tree_channels(node, out),
        Tree::Defun { body, .. } => stage_channels(body, out),
        Tree::Command { .. } => {}
    }
}

macro_rules! unsupported_test {
    ($name:ident, $tag:expr) => {
        #[test]
        fn $name() {
            let text = format!("<\"{}\":({},{})>", $tag, command(1, &["a"]), command(1, &["b"]));
            match shlower::lower_str(&text) {
                Err(Error::UnsupportedConstruct(tag)) => assert_eq!(tag, $tag),
                other => panic!("expected unsupported construct, got {other:?}"),
            }
        }
    };
}

// ── Commands ──

#[test]
fn echo_hi_is_single_stage_fragment() {
    let out = lower_one(&command(1, &["echo", "hi"]));
    let f = fragment(&out);
    let stage = f.stages().next().unwrap();
    assert_eq!(stage.name.as_literal().as_deref(), Some("echo"));
    assert_eq!(stage.options.len(), 1);
    assert_eq!(stage.options[0].as_literal().as_deref(), Some("hi"));
    assert_eq!(stage.input, ChannelId::new(0));
    assert_eq!(stage.output, ChannelId::new(1));
    assert_ne!(stage.input, stage.output);
}

#[test]
fn assignment_only_command_is_tree() {
    let out = lower_one(&assign(2, "X", "1"));
    assert!(matches!(out, Lowered::Tree(Tree::Command { line_no: 2, .. })));
}

#[test]
fn command_substitution_lowered_in_place() {
    let subst = format!("(<\"B\":{}>)", command(1, &["date"]));
    let text = format!("<\"Command\":(1,(),({},{subst}),())>", word("echo"));
    let out = lower_one(&text);
    let stage = fragment(&out).stages().next().unwrap();
    match &stage.options[0].chars()[0] {
        ArgChar::Subst(inner) => {
            let inner = fragment(inner);
            assert_eq!(stage_names(inner), ["date"]);
            assert_eq!(inner.input(), Endpoint::Bound(ChannelId::new(0)));
        }
        other => panic!("unexpected argument character: {other:?}"),
    }
    assert_eq!(stage.input, ChannelId::new(2));
}

#[test]
fn nullary_arg_chars_pass_through() {
    // tilde expansion with no user: <"T":<"None">>
    let text = format!("<\"Command\":(1,(),({},(<\"T\":<\"None\">>)),())>", word("cd"));
    let out = lower_one(&text);
    let stage = fragment(&out).stages().next().unwrap();
    assert_eq!(
        stage.options[0].chars()[0],
        ArgChar::Other(serde_json::json!({"T": "None"}))
    );
}

// ── Pipelines ──

#[test]
fn two_stage_pipe_connected() {
    let out = lower_one(&pipe(&[command(1, &["a"]), command(2, &["b"])]));
    let f = fragment(&out);
    assert_eq!(stage_names(f), ["a", "b"]);
    let stages: Vec<_> = f.stages().collect();
    assert_eq!(stages[0].output, stages[1].input);
    assert_eq!(f.input(), Endpoint::Bound(stages[0].input));
    assert_eq!(f.output(), Endpoint::Bound(stages[1].output));
}

#[test]
fn pipe_stage_order_is_concatenation() {
    let inner = wrapper("Subshell", 1, &pipe(&[command(1, &["b"]), command(1, &["c"])]), "");
    let out = lower_one(&pipe(&[command(1, &["a"]), inner, command(1, &["d"])]));
    let f = fragment(&out);
    assert_eq!(stage_names(f), ["a", "b", "c", "d"]);
    assert!(f.verify().is_ok());
}

#[test]
fn single_item_pipe_is_shape_error() {
    match shlower::lower_str(&pipe(&[command(1, &["a"])])) {
        Err(Error::Shape { construct, .. }) => assert_eq!(construct, "Pipe"),
        other => panic!("expected shape error, got {other:?}"),
    }
}

#[test]
fn pipe_with_assignment_item_keeps_unbound_gap() {
    let out = lower_one(&pipe(&[command(1, &["a"]), assign(1, "X", "1")]));
    let f = fragment(&out);
    assert_eq!(f.len(), 2);
    assert_eq!(f.output(), Endpoint::Unbound);
    assert_eq!(f.unbound_boundaries(), 1);
}

// ── Compound constructs ──

#[test]
fn and_is_never_flattened() {
    let out = lower_one(&binary("And", &command(1, &["x"]), &command(2, &["y"])));
    match out {
        Lowered::Tree(Tree::And(l, r)) => {
            assert_eq!(stage_names(fragment(&l)), ["x"]);
            assert_eq!(stage_names(fragment(&r)), ["y"]);
        }
        other => panic!("unexpected lowering: {other:?}"),
    }
}

#[test]
fn or_semi_mixed_children() {
    let text = binary(
        "Semi",
        &binary("Or", &command(1, &["x"]), &assign(1, "A", "b")),
        &pipe(&[command(2, &["p"]), command(2, &["q"])]),
    );
    match lower_one(&text) {
        Lowered::Tree(Tree::Semi(l, r)) => {
            assert!(matches!(*l, Lowered::Tree(Tree::Or(..))));
            assert_eq!(stage_names(fragment(&r)), ["p", "q"]);
        }
        other => panic!("unexpected lowering: {other:?}"),
    }
}

#[test]
fn redir_on_fragment_is_transparent() {
    let inner = command(1, &["echo", "hi"]);
    let wrapped = wrapper("Redir", 1, &inner, &output_redirect("out.txt"));
    assert_eq!(lower_one(&wrapped), lower_one(&inner));
}

#[test]
fn subshell_on_fragment_is_transparent() {
    let inner = command(2, &["grep", "x"]);
    let wrapped = wrapper("Subshell", 2, &inner, &output_redirect("matches"));
    assert_eq!(lower_one(&wrapped), lower_one(&inner));
}

#[test]
fn redir_on_tree_keeps_redirections() {
    let text = wrapper("Redir", 3, &assign(3, "X", "1"), &output_redirect("log"));
    match lower_one(&text) {
        Lowered::Tree(Tree::Redir { line_no, redirs, .. }) => {
            assert_eq!(line_no, 3);
            assert_eq!(redirs.len(), 1);
            assert_eq!(redirs[0].0["File"][0], "To");
        }
        other => panic!("unexpected lowering: {other:?}"),
    }
}

#[test]
fn background_tree_becomes_opaque_fragment() {
    let text = wrapper(
        "Background",
        1,
        &binary("And", &command(1, &["x"]), &command(1, &["y"])),
        "",
    );
    let out = lower_one(&text);
    let f = fragment(&out);
    assert!(matches!(f.nodes()[0], FragmentNode::Opaque(Tree::And(..))));
    assert_eq!(f.input(), Endpoint::Unbound);
    assert_eq!(f.output(), Endpoint::Unbound);
}

#[test]
fn defun_body_lowered() {
    let text = format!("<\"Defun\":(1,\"greet\",{})>", command(2, &["echo", "hello"]));
    match lower_one(&text) {
        Lowered::Tree(Tree::Defun { name, body, .. }) => {
            assert_eq!(name, "greet");
            assert_eq!(stage_names(fragment(&body)), ["echo"]);
        }
        other => panic!("unexpected lowering: {other:?}"),
    }
}

// ── Errors ──

unsupported_test!(unsupported_if, "If");
unsupported_test!(unsupported_while, "While");
unsupported_test!(unsupported_for, "For");
unsupported_test!(unsupported_case, "Case");
unsupported_test!(unsupported_not, "Not");
unsupported_test!(unsupported_lowercase_pipe, "pipe");

#[test]
fn command_arity_is_shape_error() {
    let text = format!("<\"Command\":(1,(),{})>", words(&["ls"]));
    match shlower::lower_str(&text) {
        Err(Error::Shape { construct, detail }) => {
            assert_eq!(construct, "Command");
            assert!(detail.contains("found 3"), "{detail}");
        }
        other => panic!("expected shape error, got {other:?}"),
    }
}

#[test]
fn bad_line_reports_line_number() {
    let text = format!("{}\n<\"Command\":(1,\n", command(1, &["a"]));
    match shlower::lower_str(&text) {
        Err(Error::Json { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected json error, got {other:?}"),
    }
}

#[test]
fn malformed_later_node_yields_no_output() {
    let text = format!("{}\n<\"Until\":(1,2)>\n", command(1, &["a"]));
    assert!(shlower::lower_str(&text).is_err());
}

// ── Whole-script properties ──

#[test]
fn channels_distinct_and_increasing_across_script() {
    let script = [
        pipe(&[command(1, &["cat", "f"]), command(1, &["sort"]), command(1, &["uniq"])]),
        binary("And", &command(2, &["x"]), &command(2, &["y"])),
        command(3, &["echo", "done"]),
    ]
    .join("\n");
    let lowered = shlower::lower_str(&script).unwrap();
    let mut channels = Vec::new();
    for l in &lowered {
        stage_channels(l, &mut channels);
    }
    // pipe rebinding reuses upstream outputs; stage outputs stay fresh
    let outputs: Vec<u64> = channels.iter().map(|(_, o)| o.value()).collect();
    assert!(outputs.windows(2).all(|w| w[0] < w[1]), "{outputs:?}");
    assert_eq!(channels.last().map(|(i, o)| (i.value(), o.value())), Some((10, 11)));
}

#[test]
fn script_shares_one_allocator() {
    let script = format!("{}\n{}\n", command(1, &["a"]), command(2, &["b"]));
    let lowered = shlower::lower_str(&script).unwrap();
    let second = fragment(&lowered[1]).stages().next().unwrap();
    assert_eq!((second.input.value(), second.output.value()), (2, 3));
}

#[test]
fn first_channel_from_options() {
    let options = LowerOptions {
        first_channel: 100,
        verify_fragments: true,
    };
    let lowered = shlower::lower_str_with(&command(1, &["a"]), options).unwrap();
    assert_eq!(fragment(&lowered[0]).input(), Endpoint::Bound(ChannelId::new(100)));
}

#[test]
fn exhausted_channel_space_aborts_run() {
    let options = LowerOptions {
        first_channel: u64::MAX,
        verify_fragments: true,
    };
    let err = shlower::lower_str_with(&command(1, &["a"]), options).unwrap_err();
    assert!(matches!(err, Error::InternalInvariant(_)), "{err}");
}

#[test]
fn blank_input_lowers_to_nothing() {
    assert!(shlower::lower_str("\n \n").unwrap().is_empty());
}

// ── Rendering ──

#[test]
fn text_listing_of_pipeline() {
    let lowered = shlower::lower_str(&pipe(&[command(1, &["cat", "a b"]), command(1, &["sort"])])).unwrap();
    assert_eq!(
        render::render_text(&lowered),
        "fragment ch0 -> ch3\n  stage ch0 -> ch1: cat 'a b'\n  stage ch1 -> ch3: sort\n"
    );
}

#[test]
fn json_output_parses_back() {
    let lowered = shlower::lower_str(&binary("And", &command(1, &["x"]), &command(2, &["y"]))).unwrap();
    let json = render::render_json(&lowered, true).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(doc["Tree"]["And"][1]["Fragment"]["input"], 2);
}

#[test]
fn json_keeps_input_character_encoding() {
    let text = format!(
        "<\"Command\":(1,(),({},(<\"C\":104>,<\"E\":36>)),())>",
        word("e")
    );
    let lowered = shlower::lower_str(&text).unwrap();
    let json = render::render_json(&lowered, false).unwrap();
    let doc: serde_json::Value = serde_json::from_str(json.trim()).unwrap();
    let stage = &doc["Fragment"]["nodes"][0]["Stage"];
    assert_eq!(stage["name"], serde_json::json!([{"C": 101}]));
    assert_eq!(stage["options"][0], serde_json::json!([{"C": 104}, {"E": 36}]));
}
