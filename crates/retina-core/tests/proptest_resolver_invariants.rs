//! Property-based invariant tests for density selection and URL resolution.
//!
//! These hold for **any** density, cap, and source URL:
//!
//! 1. The chosen cap is min(density, requested).
//! 2. No resolution below cap 2 or for empty sources.
//! 3. Resolution only ever inserts `@{cap}x`; removing it restores the source.
//! 4. Query strings and fragments after the extension survive untouched.
//! 5. Dispatch is idempotent: a second run issues no probes.

use proptest::prelude::*;
use retina_core::headless::{HeadlessDocument, HeadlessElement};
use retina_core::{Density, Retina, choose_cap, insert_density_suffix, resolve_url};

// ── Helpers ─────────────────────────────────────────────────────────────

fn density_strategy() -> impl Strategy<Value = Density> {
    (1u32..=8).prop_map(|n| Density::new(n).unwrap())
}

fn stem_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9/_-]{1,24}"
}

fn extension_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("png".to_owned()),
        Just("jpg".to_owned()),
        Just("jpeg".to_owned()),
        Just("webp".to_owned()),
        Just("svg".to_owned()),
        Just("GIF".to_owned()),
    ]
}

fn query_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "\\?[a-z0-9=&.]{0,12}"]
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Cap selection
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn cap_is_min_of_density_and_request(density in density_strategy(), requested in -4i64..=16) {
        let cap = choose_cap(density, requested);
        prop_assert_eq!(cap, i64::from(density.get()).min(requested));
        prop_assert!(cap <= i64::from(density.get()));
        prop_assert!(cap <= requested);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. No swap below 2x
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn low_caps_never_resolve(src in ".{0,40}", cap in -8i64..=1) {
        prop_assert_eq!(resolve_url(&src, cap), None);
    }

    #[test]
    fn empty_source_never_resolves(cap in 2i64..=8) {
        prop_assert_eq!(resolve_url("", cap), None);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Insertion only
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resolution_is_pure_insertion(src in ".{1,40}", cap in 2i64..=8) {
        let resolved = resolve_url(&src, cap).unwrap();
        let marker = format!("@{cap}x");
        if resolved == src {
            prop_assert_eq!(insert_density_suffix(&src, cap), src.as_str());
        } else {
            prop_assert_eq!(resolved.len(), src.len() + marker.len());
            let restorable = resolved.match_indices(&marker).any(|(at, _)| {
                format!("{}{}", &resolved[..at], &resolved[at + marker.len()..]) == src
            });
            prop_assert!(restorable, "{resolved:?} is not {src:?} plus {marker}");
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Well-formed asset URLs
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn asset_urls_get_suffix_before_extension(
        stem in stem_strategy(),
        ext in extension_strategy(),
        query in query_strategy(),
        cap in 2i64..=4,
    ) {
        let src = format!("{stem}.{ext}{query}");
        let expected = format!("{stem}@{cap}x.{ext}{query}");
        prop_assert_eq!(resolve_url(&src, cap), Some(expected));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Idempotent dispatch
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn second_dispatch_issues_no_probes(
        ratio in 0.5f64..4.0,
        caps in proptest::collection::vec(1i64..=4, 1..8),
    ) {
        let doc = HeadlessDocument::new().with_pixel_ratio(ratio);
        for (i, cap) in caps.iter().enumerate() {
            doc.append(
                HeadlessElement::img(&format!("img{i}.png"))
                    .with_attribute("data-rjs", &cap.to_string()),
            );
        }
        let retina = Retina::detect(doc.clone());

        let first = retina.run_document();
        prop_assert_eq!(first.scanned, caps.len());
        doc.complete_all();
        let second = retina.run_document();
        prop_assert_eq!(second.probed(), 0);
        prop_assert_eq!(second.already_processed, first.probed());
    }
}
