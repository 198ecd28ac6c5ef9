// tests/text_pipeline.rs
//
// Cross-operation properties of the post text pipeline on a handful of
// realistic civic posts.

use civic_post_review::text::{
    clean_text, extract_hashtags, extract_mentions, extract_urls, TextError, TextNormalizer,
    ERR_EMPTY, ERR_REPETITION, ERR_SPAM,
};

const SAMPLES: &[&str] = &[
    "Town hall tonight at 7pm!   Bring questions for @CouncilorReyes #LocalGov",
    "  Road closures on Main St. ☕ see https://city.example/roads?id=12 for details  ",
    "We did it!!! The library stays open 🎉 #SaveTheLibrary #SaveTheLibrary",
    "ﬁnal budget vote:\tThursday\n\nall welcome",
    "\u{1100}$\u{1161} ok",
    "\u{3b1}$\u{345} vote",
    "",
];

#[test]
fn clean_is_idempotent_and_trimmed() {
    for s in SAMPLES {
        let once = clean_text(s);
        assert_eq!(clean_text(&once), once, "not idempotent for {s:?}");
        assert_eq!(once.trim(), once);
        assert!(!once.contains("  "));
        assert!(!once.contains('\n') && !once.contains('\t'));
    }
}

#[test]
fn clean_and_validate_agrees_with_validate_on_cleaned_text() {
    let n = TextNormalizer::default();
    for s in SAMPLES {
        let post = n.clean_and_validate(s);
        assert_eq!(post.cleaned_text, n.clean(s));
        assert_eq!(post.outcome, n.validate(&post.cleaned_text));
        assert_eq!(post.outcome.is_valid, post.outcome.errors.is_empty());
    }
}

#[test]
fn empty_post_reports_only_the_empty_error() {
    let n = TextNormalizer::default();
    let out = n.validate(" \n\t ");
    assert_eq!(out.errors, vec![ERR_EMPTY.to_string()]);
}

#[test]
fn several_errors_accumulate_in_order() {
    let n = TextNormalizer::with_max_length(10).unwrap();
    let out = n.validate("NOOOOO WAY!!!!!!");
    assert_eq!(
        out.errors,
        vec![
            "Post exceeds maximum length of 10 characters".to_string(),
            ERR_REPETITION.to_string(),
            ERR_SPAM.to_string(),
        ]
    );
}

#[test]
fn extraction_is_sorted_and_deduplicated() {
    let text = SAMPLES[2];
    assert_eq!(extract_hashtags(text), vec!["SaveTheLibrary"]);

    let text = "cc @zoe @Adam @zoe";
    assert_eq!(extract_mentions(text), vec!["Adam", "zoe"]);

    assert_eq!(
        extract_urls(SAMPLES[1]),
        vec!["https://city.example/roads?id=12"]
    );
}

#[test]
fn statistics_counts_match_lists() {
    let n = TextNormalizer::default();
    for s in SAMPLES {
        let st = n.statistics(s);
        assert_eq!(st.hashtag_count, st.hashtags.len());
        assert_eq!(st.mention_count, st.mentions.len());
        assert_eq!(st.url_count, st.urls.len());
        assert_eq!(st.cleaned_length, st.character_count);
        assert_eq!(st.original_length, s.chars().count());
    }
}

#[test]
fn truncate_respects_limit_for_every_sample() {
    let n = TextNormalizer::default();
    for s in SAMPLES {
        for max in [3usize, 10, 25, 280] {
            let out = n.truncate(s, Some(max)).unwrap();
            assert!(out.chars().count() <= max, "{out:?} longer than {max}");
            if s.chars().count() <= max {
                assert_eq!(out, *s);
            } else {
                assert!(out.ends_with("..."));
            }
        }
    }
    assert_eq!(
        n.truncate("anything", Some(2)),
        Err(TextError::TruncateTooShort { min: 3, got: 2 })
    );
}
