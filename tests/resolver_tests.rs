use proptest::prelude::*;
use std::collections::BTreeSet;

use lecture_portal::{
    models::language::LanguageCode,
    services::resolver::{resolve, resolve_query, ResolveError, Resolution},
};

fn available(codes: &[LanguageCode]) -> BTreeSet<LanguageCode> {
    codes.iter().copied().collect()
}

#[test]
fn test_requested_language_with_video_is_served() {
    let langs = available(&[LanguageCode::Ko, LanguageCode::En, LanguageCode::Zh]);

    let resolution = resolve(Some(LanguageCode::En), &langs).unwrap();

    assert_eq!(resolution, Resolution { actual: LanguageCode::En, fell_back: false });
}

#[test]
fn test_requested_language_without_video_falls_back_to_korean() {
    let langs = available(&[LanguageCode::Ko, LanguageCode::Zh]);

    let resolution = resolve(Some(LanguageCode::Vi), &langs).unwrap();

    assert_eq!(resolution, Resolution { actual: LanguageCode::Ko, fell_back: true });
}

#[test]
fn test_no_request_plays_korean() {
    let langs = available(&[LanguageCode::Ko, LanguageCode::En]);

    let resolution = resolve(None, &langs).unwrap();

    assert_eq!(resolution.actual, LanguageCode::Ko);
    assert!(resolution.fell_back);
}

#[test]
fn test_requesting_korean_is_not_a_fallback() {
    let langs = available(&[LanguageCode::Ko]);

    let resolution = resolve(Some(LanguageCode::Ko), &langs).unwrap();

    assert_eq!(resolution, Resolution { actual: LanguageCode::Ko, fell_back: false });
}

#[test]
fn test_missing_korean_is_an_error() {
    let langs = available(&[LanguageCode::En, LanguageCode::Ja]);

    assert_eq!(resolve(Some(LanguageCode::En), &langs), Err(ResolveError::MissingDefault));
    assert_eq!(resolve(None, &BTreeSet::new()), Err(ResolveError::MissingDefault));
}

#[test]
fn test_query_values_are_parsed_leniently() {
    let langs = available(&[LanguageCode::Ko, LanguageCode::Th]);

    assert_eq!(resolve_query(Some(" TH "), &langs).unwrap().actual, LanguageCode::Th);
    assert!(!resolve_query(Some("Th"), &langs).unwrap().fell_back);
}

#[test]
fn test_malformed_query_values_fall_back() {
    let langs = available(&[LanguageCode::Ko, LanguageCode::En]);

    for raw in ["", "   ", "english", "fr", "e n", "ko-KR"] {
        let resolution = resolve_query(Some(raw), &langs).unwrap();
        assert_eq!(
            resolution,
            Resolution { actual: LanguageCode::Ko, fell_back: true },
            "query value {:?}",
            raw
        );
    }
}

#[test]
fn test_korean_only_lecture_falls_back_for_chinese() {
    let langs = available(&[LanguageCode::Ko]);

    let resolution = resolve(Some(LanguageCode::Zh), &langs).unwrap();

    assert_eq!(resolution, Resolution { actual: LanguageCode::Ko, fell_back: true });
}

#[test]
fn test_missing_request_plays_korean_even_with_translations() {
    let langs = available(&[LanguageCode::Ko, LanguageCode::Ja]);

    let resolution = resolve(None, &langs).unwrap();

    assert_eq!(resolution, Resolution { actual: LanguageCode::Ko, fell_back: true });
    assert_eq!(resolve_query(None, &langs).unwrap(), resolution);
}

#[test]
fn test_unrecognized_code_falls_back_to_korean() {
    let langs = available(&[LanguageCode::Ko, LanguageCode::Vi, LanguageCode::Th]);

    let resolution = resolve_query(Some("xx"), &langs).unwrap();

    assert_eq!(resolution, Resolution { actual: LanguageCode::Ko, fell_back: true });
}

fn language() -> impl Strategy<Value = LanguageCode> {
    prop::sample::select(LanguageCode::ALL.to_vec())
}

fn published_set() -> impl Strategy<Value = BTreeSet<LanguageCode>> {
    prop::collection::btree_set(language(), 0..6).prop_map(|mut langs| {
        langs.insert(LanguageCode::Ko);
        langs
    })
}

proptest! {
    #[test]
    fn served_language_always_has_a_video(
        requested in prop::option::of(language()),
        langs in published_set(),
    ) {
        let resolution = resolve(requested, &langs).unwrap();
        prop_assert!(langs.contains(&resolution.actual));
    }

    #[test]
    fn every_available_language_is_served_as_requested(langs in published_set()) {
        for lang in &langs {
            let resolution = resolve(Some(*lang), &langs).unwrap();
            prop_assert_eq!(resolution, Resolution { actual: *lang, fell_back: false });
        }
    }

    #[test]
    fn unavailable_requests_fall_back_to_korean(
        requested in language(),
        langs in published_set(),
    ) {
        prop_assume!(!langs.contains(&requested));
        let resolution = resolve(Some(requested), &langs).unwrap();
        prop_assert_eq!(resolution, Resolution { actual: LanguageCode::Ko, fell_back: true });
    }

    #[test]
    fn identical_inputs_resolve_identically(
        requested in prop::option::of(language()),
        langs in prop::collection::btree_set(language(), 0..7),
    ) {
        prop_assert_eq!(resolve(requested, &langs), resolve(requested, &langs));
    }

    #[test]
    fn identical_query_strings_resolve_identically(
        raw in prop::option::of(".{0,12}"),
        langs in published_set(),
    ) {
        let first = resolve_query(raw.as_deref(), &langs);
        let second = resolve_query(raw.as_deref(), &langs);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn only_korean_is_substituted(
        requested in prop::option::of(language()),
        langs in published_set(),
    ) {
        let resolution = resolve(requested, &langs).unwrap();
        if resolution.fell_back {
            prop_assert_eq!(resolution.actual, LanguageCode::Ko);
        } else {
            prop_assert_eq!(Some(resolution.actual), requested);
        }
    }

    #[test]
    fn resolving_the_result_again_is_stable(
        requested in prop::option::of(language()),
        langs in published_set(),
    ) {
        let first = resolve(requested, &langs).unwrap();
        let second = resolve(Some(first.actual), &langs).unwrap();
        prop_assert_eq!(second.actual, first.actual);
        prop_assert!(!second.fell_back);
    }

    #[test]
    fn arbitrary_query_strings_never_fail_for_published_lectures(
        raw in ".{0,12}",
        langs in published_set(),
    ) {
        let resolution = resolve_query(Some(&raw), &langs).unwrap();
        prop_assert!(langs.contains(&resolution.actual));
    }
}
