use std::path::Path;
use tree2tax::model::PhyloTreeBuilder;
use tree2tax::newick::{NewickParser, parse_file, parse_str};
use tree2tax::parser::{ByteParser, ParsingErrorType};

// --- TESTS NEWICK STRING PARSING ---
#[test]
fn test_basic_tree() {
    let newick = "((A:1.0,B:2.0)C:3.0,D:4.0)root:0.5;";
    let tree = parse_str(newick).unwrap();

    // Test counts
    assert_eq!(tree.num_tips(), 3);
    assert_eq!(tree.num_vertices(), 5);

    // Test relationships
    // - Root has children (C, D)
    let root = tree.root();
    assert_eq!(root.name(), Some("root"));
    assert_eq!(*root.branch_length().unwrap(), 0.5);
    let &[c, d] = root.children() else {
        panic!("root should have two children");
    };

    // - Internal vertex has children (A, B)
    let internal = tree.vertex(c);
    assert_eq!(internal.name(), Some("C"));
    assert!(!internal.is_tip());
    let &[a, b] = internal.children() else {
        panic!("C should have two children");
    };

    // - Three tips with names and lengths
    assert_eq!(tree[a].name(), Some("A"));
    assert_eq!(tree[b].name(), Some("B"));
    assert_eq!(tree[d].name(), Some("D"));
    assert_eq!(tree[b].length(), 2.0);
    assert_eq!(tree[d].length(), 4.0);

    // - Parent relationships
    assert_eq!(internal.parent(), Some(tree.root_index()));
    assert_eq!(tree[a].parent(), Some(c));
    assert!(tree.is_valid());
}

#[test]
fn test_multifurcating_and_unary() {
    let tree = parse_str("((A,B,C)'f__fam',((D)'g__gen'))root;").unwrap();
    assert_eq!(tree.num_tips(), 4);
    assert_eq!(tree.root().children().len(), 2);

    let family = tree.find_by_name("f__fam").unwrap();
    assert_eq!(tree[family].children().len(), 3);
    let genus = tree.find_by_name("g__gen").unwrap();
    assert_eq!(tree[genus].children().len(), 1);
    assert_eq!(tree[genus].name(), Some("g__gen"));
    assert!(tree.is_valid());
}

#[test]
fn test_quoted_labels_with_separators() {
    let tree = parse_str("((A:1,B:2)'95:g__Halo; s__fu':3,'Wilson''s tip':4);").unwrap();
    let genus = tree.find_by_name("95:g__Halo; s__fu").unwrap();
    assert_eq!(tree[genus].length(), 3.0);
    assert!(tree.find_by_name("Wilson's tip").is_some());
}

#[test]
fn test_bootstrap_internal_labels() {
    let tree = parse_str("((A:1,B:2)0.95:3,C:4)root;").unwrap();
    let support = tree.find_by_name("0.95").unwrap();
    assert_eq!(tree[support].children().len(), 2);
    assert_eq!(tree[support].length(), 3.0);
}

#[test]
fn test_whitespace_and_comments() {
    let tree = parse_str(" ( [first] A : 1 ,\n\tB:2e-1 [&annotation] ) root ; ").unwrap();
    assert_eq!(tree.num_tips(), 2);
    let b = tree.find_by_name("B").unwrap();
    assert!((tree[b].length() - 0.2).abs() < 1e-12);
}

#[test]
fn test_missing_branch_lengths_and_names() {
    let tree = parse_str("((,),);").unwrap();
    assert_eq!(tree.num_tips(), 3);
    assert!(tree.pre_order_iter().all(|v| v.name().is_none() && !v.has_branch_length()));
}

#[test]
fn test_single_tip_tree() {
    let tree = parse_str("A;").unwrap();
    assert_eq!(tree.num_tips(), 1);
    assert_eq!(tree.root().name(), Some("A"));
}

#[test]
fn test_parse_all() {
    let byte_parser = ByteParser::for_str("(A,B);\n[second](C,(D,E));\n");
    let mut parser = NewickParser::new(PhyloTreeBuilder::new()).with_num_vertices(5);
    let trees = parser.parse_all(byte_parser).unwrap();
    assert_eq!(trees.len(), 2);
    assert_eq!(trees[0].num_tips(), 2);
    assert_eq!(trees[1].num_tips(), 3);
}

// --- TESTS PARSING ERRORS ---
#[test]
fn test_missing_semicolon() {
    let err = parse_str("(A,B)").unwrap_err();
    assert_eq!(err.kind(), &ParsingErrorType::UnexpectedEOF);

    let err = parse_str("(A,B) (C,D);").unwrap_err();
    assert!(matches!(err.kind(), ParsingErrorType::InvalidNewickString(_)));
}

#[test]
fn test_unclosed_parenthesis() {
    let err = parse_str("((A,B),C;").unwrap_err();
    assert!(matches!(err.kind(), ParsingErrorType::InvalidNewickString(_)));
}

#[test]
fn test_negative_branch_length() {
    let err = parse_str("(A:-1,B:2);").unwrap_err();
    assert!(matches!(err.kind(), ParsingErrorType::InvalidNewickString(_)));
}

#[test]
fn test_invalid_branch_length() {
    let err = parse_str("(A:x,B:2);").unwrap_err();
    assert!(matches!(err.kind(), ParsingErrorType::InvalidNewickString(_)));
}

#[test]
fn test_unclosed_quote() {
    let err = parse_str("(A,'g__never closed);").unwrap_err();
    assert_eq!(err.kind(), &ParsingErrorType::UnclosedQuote);
}

#[test]
fn test_empty_input() {
    let err = parse_str("  ").unwrap_err();
    assert_eq!(err.kind(), &ParsingErrorType::UnexpectedEOF);
}

#[test]
fn test_error_reports_position() {
    let err = parse_str("(A,B)X:1?;").unwrap_err();
    assert!(err.position() > 0);
    assert!(err.to_string().contains("position"));
}

// --- TESTS NEWICK FILE PARSING ---
#[test]
fn test_parse_file() {
    let path = Path::new("tests").join("fixtures").join("halobacteria.tree");
    let tree = parse_file(&path).unwrap();
    assert_eq!(tree.num_tips(), 8);
    assert!(tree.find_by_name("g__Haloferax").is_some());
}

#[test]
fn test_parse_missing_file() {
    let err = parse_file("tests/fixtures/does_not_exist.tree").unwrap_err();
    assert!(matches!(err.kind(), ParsingErrorType::IoError(_)));
}
