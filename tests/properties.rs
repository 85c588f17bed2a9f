use proptest::prelude::*;
use seo_scorer::{analyze, AnalysisInput};

fn non_blank_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?#\n]{1,600}".prop_filter("needs non-whitespace", |s| !s.trim().is_empty())
}

proptest! {
    #[test]
    fn scores_stay_in_bounds(
        content in non_blank_text(),
        keyword in "[a-z ]{0,12}",
        title in ".{0,80}",
        description in ".{0,200}",
    ) {
        let input = AnalysisInput::new(content)
            .with_target_keyword(keyword)
            .with_meta_title(title)
            .with_meta_description(description);
        let result = analyze(&input).unwrap();

        prop_assert!(result.overall_score <= 100);
        prop_assert!(result.overall_score >= 50);
        prop_assert!(result.readability_score <= 100);
        prop_assert!(!result.suggestions.is_empty());
        prop_assert!(result.keyword_density.len() <= 10);

        let total: f64 = result.keyword_density.iter().map(|(_, d)| d).sum();
        prop_assert!(total <= 100.5, "density total {} exceeds 100", total);
    }

    #[test]
    fn analysis_is_deterministic(content in non_blank_text(), keyword in "[a-z]{0,8}") {
        let input = AnalysisInput::new(content).with_target_keyword(keyword);
        prop_assert_eq!(analyze(&input).unwrap(), analyze(&input).unwrap());
    }

    #[test]
    fn density_ranking_is_non_increasing(content in non_blank_text()) {
        let result = analyze(&AnalysisInput::new(content)).unwrap();
        let densities: Vec<f64> = result.keyword_density.iter().map(|(_, d)| d).collect();
        prop_assert!(densities.windows(2).all(|w| w[0] >= w[1]));
    }
}
