//! Property tests for token substitution.

use proptest::prelude::*;

use liftoff::domain::services::Substitutions;

#[derive(Debug, Clone)]
enum Piece {
    Text(String),
    Token(usize),
}

fn token_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z][A-Z_]{0,10}")
        .unwrap()
        .prop_map(|name| format!("${{{}}}", name))
}

fn value() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z0-9/._-]{0,20}").unwrap()
}

fn literal() -> impl Strategy<Value = String> {
    // no '$', so literals never start a token
    proptest::string::string_regex("[a-zA-Z0-9 :/\"{}.,-]{0,20}").unwrap()
}

fn bindings() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::btree_map(token_name(), value(), 1..6)
        .prop_map(|map| map.into_iter().collect())
}

fn document(tokens: usize) -> impl Strategy<Value = Vec<Piece>> {
    let piece = prop_oneof![
        literal().prop_map(Piece::Text),
        (0..tokens).prop_map(Piece::Token),
    ];
    proptest::collection::vec(piece, 0..12)
}

fn case() -> impl Strategy<Value = (Vec<(String, String)>, Vec<Piece>)> {
    bindings().prop_flat_map(|bindings| {
        let tokens = bindings.len();
        (Just(bindings), document(tokens))
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: rendering with no bindings never changes the input.
    #[test]
    fn property_empty_substitutions_are_identity(input in ".{0,64}") {
        prop_assert_eq!(Substitutions::new().render(&input), input);
    }

    /// PROPERTY: every bound token is replaced by its value, text between
    /// tokens is kept, and values are not scanned again.
    #[test]
    fn property_render_replaces_each_token_once((bindings, pieces) in case()) {
        let subs: Substitutions = bindings.iter().cloned().collect();

        let mut input = String::new();
        let mut expected = String::new();
        for piece in &pieces {
            match piece {
                Piece::Text(text) => {
                    input.push_str(text);
                    expected.push_str(text);
                }
                Piece::Token(i) => {
                    let (token, value) = &bindings[*i];
                    input.push_str(token);
                    expected.push_str(value);
                }
            }
        }

        let rendered = subs.render(&input);
        prop_assert_eq!(&rendered, &expected);
        prop_assert!(!rendered.contains('$'));
    }

    /// PROPERTY: tokens without a binding survive verbatim.
    #[test]
    fn property_unbound_tokens_stay((bindings, pieces) in case(), extra in token_name()) {
        let subs: Substitutions = bindings
            .iter()
            .filter(|(token, _)| token != &extra)
            .cloned()
            .collect();
        let mut input: String = pieces
            .iter()
            .filter_map(|piece| match piece {
                Piece::Text(text) => Some(text.clone()),
                Piece::Token(_) => None,
            })
            .collect();
        input.push_str(&extra);

        prop_assert!(subs.render(&input).ends_with(&extra));
    }
}
