use crate::abbreviations::{abbreviate, expand, PhraseMap};
use crate::grammar::*;
use crate::*;

// ========== Grammar ==========

#[test]
fn test_sigil_letters_roundtrip() {
    for sigil in Sigil::ALL {
        assert_eq!(Sigil::from_char(sigil.as_char()), Some(sigil));
    }
    assert_eq!(Sigil::from_char('Q'), None);
}

#[test]
fn test_only_blob_is_heredoc() {
    let heredoc: Vec<_> = Sigil::ALL.into_iter().filter(|s| s.is_heredoc()).collect();
    assert_eq!(heredoc, vec![Sigil::Blob]);
}

#[test]
fn test_valid_letters_listing() {
    assert_eq!(Sigil::valid_letters(), "R, P, N, S, T, X, Z, C, B");
}

#[test]
fn test_operators_longest_first() {
    assert_eq!(Operator::leading("?!x->y"), Some(Operator::IfNot));
    assert_eq!(Operator::leading("?x->y"), Some(Operator::If));
    assert_eq!(Operator::leading("!!x"), Some(Operator::Never));
    assert_eq!(Operator::leading("@>docs"), Some(Operator::Delegate));
    assert_eq!(Operator::leading("plain"), None);
}

#[test]
fn test_operator_symbols() {
    assert_eq!(Operator::Then.symbol(), "->");
    assert_eq!(Operator::Definition.to_string(), "::");
    assert_eq!(Operator::Approx.symbol(), "~");
}

#[test]
fn test_sigil_serializes_as_letter() {
    let json = serde_json::to_string(&Sigil::Negation).unwrap();
    assert_eq!(json, "\"N\"");
    let back: Sigil = serde_json::from_str("\"Z\"").unwrap();
    assert_eq!(back, Sigil::Zone);
    assert!(serde_json::from_str::<Sigil>("\"Q\"").is_err());
}

// ========== Document model ==========

fn doc_with_constants() -> Document {
    Document::new(
        Metadata::new("test", "Test", "test.md", "2026-01-01T00:00:00Z"),
        vec![
            Block::new(Sigil::Rule, "rules", vec!["!!x".into()]),
            Block::new(
                Sigil::Constant,
                "abbr",
                vec!["wp::WordPress;dp::Drupal".into(), "$cfg::/etc/app/config".into()],
            ),
        ],
    )
}

#[test]
fn test_block_new_sets_heredoc() {
    assert!(Block::blob("code", vec![]).is_heredoc);
    assert!(!Block::new(Sigil::Rule, "r", vec![]).is_heredoc);
}

#[test]
fn test_block_header() {
    assert_eq!(Block::new(Sigil::Priority, "defaults", vec![]).header(), "@P:defaults");
}

#[test]
fn test_document_version() {
    assert_eq!(doc_with_constants().version, "v1");
}

#[test]
fn test_get_block() {
    let doc = doc_with_constants();
    assert_eq!(doc.block("abbr").map(|b| b.sigil), Some(Sigil::Constant));
    assert!(doc.block("missing").is_none());
}

#[test]
fn test_blocks_by_sigil() {
    let doc = doc_with_constants();
    assert_eq!(doc.blocks_by_sigil(Sigil::Rule).count(), 1);
    assert_eq!(doc.blocks_by_sigil(Sigil::Blob).count(), 0);
}

#[test]
fn test_constants_extraction() {
    let constants: Vec<(String, String)> = doc_with_constants().constants().into_iter().collect();
    assert_eq!(
        constants,
        vec![
            ("wp".to_string(), "WordPress".to_string()),
            ("dp".to_string(), "Drupal".to_string()),
            ("$cfg".to_string(), "/etc/app/config".to_string()),
        ]
    );
}

#[test]
fn test_constants_later_key_overwrites_in_place() {
    let doc = Document::new(
        Metadata::new("t", "T", "t.md", "2026-01-01T00:00:00Z"),
        vec![
            Block::new(Sigil::Constant, "a", vec!["x::1;y::2".into()]),
            Block::new(Sigil::Constant, "b", vec!["x::3".into(), "no pair here".into()]),
        ],
    );
    let constants = doc.constants();
    assert_eq!(constants.get_index(0), Some((&"x".to_string(), &"3".to_string())));
    assert_eq!(constants.len(), 2);
}

// ========== Abbreviations ==========

#[test]
fn test_abbreviate_known_word() {
    assert_eq!(abbreviate("module", None), "mod");
    assert_eq!(abbreviate("plugin", None), "plg");
    assert_eq!(abbreviate("maintained", None), "mnt");
    assert_eq!(abbreviate("WordPress", None), "wp");
    assert_eq!(abbreviate("Drupal", None), "dp");
}

#[test]
fn test_abbreviate_case_insensitive() {
    assert_eq!(abbreviate("Module", None), "mod");
    assert_eq!(abbreviate("PLUGIN", None), "plg");
    assert_eq!(abbreviate("wordpress", None), "wp");
}

#[test]
fn test_abbreviate_unknown_word() {
    assert_eq!(abbreviate("foobar", None), "foobar");
}

#[test]
fn test_multi_word_abbreviations() {
    assert_eq!(abbreviate("dependency injection", None), "di");
    assert_eq!(abbreviate("pull request", None), "pr");
    assert_eq!(abbreviate("developer experience", None), "dx");
}

#[test]
fn test_expand_known_token() {
    assert_eq!(expand("mod", None), "module");
    assert_eq!(expand("plg", None), "plugin");
    assert_eq!(expand("wp", None), "WordPress");
}

#[test]
fn test_expand_is_exact_match_only() {
    assert_eq!(expand("MOD", None), "MOD");
    assert_eq!(expand("xyz", None), "xyz");
}

#[test]
fn test_every_token_decodes() {
    let table = AbbreviationTable::builtin();
    for (full, token) in table.encode.iter() {
        assert!(table.decode.contains_key(token), "token '{token}' for '{full}' missing");
    }
}

#[test]
fn test_decode_collision_first_wins() {
    let table = AbbreviationTable::builtin();
    assert_eq!(table.decode.get("cfg"), Some("configuration"));
    assert_eq!(table.decode.get("req"), Some("require"));
    assert_eq!(table.decode.get("cch"), Some("cache"));
}

#[test]
fn test_phrase_map_reinsert_keeps_position() {
    let mut map: PhraseMap = [("a", "1"), ("b", "2")].into_iter().collect();
    assert_eq!(map.insert("a", "3"), Some("1".to_string()));
    let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(map.get("a"), Some("3"));
}

#[test]
fn test_phrase_map_merge_and_inverse() {
    let base: PhraseMap = [("module", "mod"), ("modules", "mods")].into_iter().collect();
    let overrides: PhraseMap = [("module", "m"), ("widget", "m")].into_iter().collect();
    let merged = base.merged(&overrides);
    let keys: Vec<_> = merged.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["module", "modules", "widget"]);
    assert_eq!(merged.inverse_first_wins().get("m"), Some("module"));
    assert_eq!(merged.inverse_last_wins().get("m"), Some("widget"));
}

#[test]
fn test_overrides_from_json() {
    let overrides =
        AbbreviationOverrides::from_json(r#"{"frobnicator": "frob", "widget": "w", "gadget": "w"}"#)
            .unwrap();
    assert_eq!(overrides.encode.get("frobnicator"), Some("frob"));
    assert_eq!(overrides.decode.get("frob"), Some("frobnicator"));
    // exact inverse: last key wins on collision
    assert_eq!(overrides.decode.get("w"), Some("gadget"));
}

#[test]
fn test_overrides_reject_non_object() {
    let err = AbbreviationOverrides::from_json("[1, 2]").unwrap_err();
    assert!(matches!(err, CpfError::InvalidAbbreviations(_)));
}

#[test]
fn test_overrides_reject_non_string_value() {
    let err = AbbreviationOverrides::from_json(r#"{"module": 3}"#).unwrap_err();
    assert!(err.to_string().contains("module"));
}

#[test]
fn test_overrides_bad_json() {
    let err = AbbreviationOverrides::from_json("{not json").unwrap_err();
    assert!(matches!(err, CpfError::Serialization(_)));
}

#[test]
fn test_with_overrides_does_not_mutate_builtin() {
    let custom: PhraseMap = [("module", "m")].into_iter().collect();
    let overrides = AbbreviationOverrides::from_encode(custom);
    let merged = AbbreviationTable::builtin().with_overrides(&overrides);
    assert_eq!(merged.abbreviate("module"), "m");
    assert_eq!(merged.expand("m"), "module");
    assert_eq!(AbbreviationTable::builtin().abbreviate("module"), "mod");
}

#[test]
fn test_empty_table_passthrough() {
    let table = AbbreviationTable::empty();
    assert_eq!(table.abbreviate("module"), "module");
    assert_eq!(table.expand("mod"), "mod");
}

// ========== Config / errors ==========

#[test]
fn test_config_defaults() {
    let cfg = EncoderConfig::default();
    assert_eq!(cfg.path_alias.min_path_len, 30);
    assert_eq!(cfg.path_alias.min_occurrences, 2);
    assert_eq!(cfg.path_alias.max_alias_len, 12);
    assert_eq!(cfg.doc_id_max_len, 40);
    assert_eq!(cfg.block_id_max_len, 50);
    assert!(cfg.extract_code_blocks);
}

#[test]
fn test_config_partial_json() {
    let cfg = EncoderConfig::from_json(r#"{"path_alias": {"min_path_len": 10}}"#).unwrap();
    assert_eq!(cfg.path_alias.min_path_len, 10);
    assert_eq!(cfg.path_alias.min_occurrences, 2);
    assert_eq!(cfg.block_id_max_len, 50);
}

#[test]
fn test_parse_error_display() {
    let err = ParseError::new(3, "Expected '---' separator");
    assert_eq!(err.to_string(), "Line 3: Expected '---' separator");
    let wrapped: CpfError = err.into();
    assert_eq!(wrapped.to_string(), "Line 3: Expected '---' separator");
}
