use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use seo_research::{
    analyze, parse_slug, MorphologyConfig, Paper, Research, ResearchError, ResearchRegistry,
    ResearchResult, Researcher,
};

fn run<T>(paper: &Paper, f: impl FnOnce(&Researcher<'_>) -> T) -> T {
    let config = MorphologyConfig::builtin();
    let registry = ResearchRegistry::with_defaults();
    let researcher = Researcher::new(paper, &config, &registry);
    f(&researcher)
}

fn slug_result(paper: &Paper) -> (usize, f64) {
    run(paper, |r| {
        let result = r.get_research("keywordCountInUrl").unwrap();
        let slug = result.as_keyphrase_in_slug().unwrap();
        (slug.keyphrase_length, slug.percent_word_matches)
    })
}

#[test]
fn parse_slug_replaces_dashes_and_underscores() {
    assert_eq!(parse_slug("pop-art_project"), "pop art project");
    assert_eq!(parse_slug("caf\u{e9}+bar"), "caf\u{e9}+bar");
}

#[test]
fn keyphrase_fully_in_slug() {
    let paper = Paper::new("")
        .with_keyword("pop art")
        .with_slug("pop-art-exhibit");
    assert_eq!(slug_result(&paper), (2, 100.0));
}

#[test]
fn keyphrase_absent_from_slug() {
    let paper = Paper::new("")
        .with_keyword("gallery")
        .with_slug("pop-art-exhibit");
    let (length, percent) = slug_result(&paper);
    assert_eq!(length, 1);
    assert_eq!(percent, 0.0);
}

#[test]
fn hyphenated_keyphrase_matches_slug() {
    let paper = Paper::new("")
        .with_keyword("pop-art")
        .with_slug("pop-art-exhibit");
    assert_eq!(slug_result(&paper), (2, 100.0));
}

#[test]
fn empty_keyphrase_yields_zero() {
    let paper = Paper::new("Some text.").with_slug("pop-art-exhibit");
    assert_eq!(slug_result(&paper), (0, 0.0));
}

#[test]
fn slug_falls_back_to_url() {
    let paper = Paper::new("")
        .with_keyword("pop art")
        .with_url("https://example.com/blog/pop-art-exhibit/");
    assert_eq!(slug_result(&paper), (2, 100.0));
}

#[test]
fn missing_slug_and_url_is_not_an_error() {
    let paper = Paper::new("").with_keyword("pop art");
    assert_eq!(slug_result(&paper), (2, 0.0));
}

#[test]
fn morphology_is_memoized() {
    let paper = Paper::new("").with_keyword("pop art");
    run(&paper, |r| {
        let first = r.get_research("morphology").unwrap();
        let second = r.get_research("morphology").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&r.morphology().unwrap(), &r.morphology().unwrap()));
    });
}

#[test]
fn slug_research_leaves_cached_morphology_untouched() {
    let paper = Paper::new("")
        .with_keyword("pop-art")
        .with_slug("pop-art-exhibit");
    run(&paper, |r| {
        let before = r.morphology().unwrap();
        let snapshot = (*before).clone();
        r.get_research("keywordCountInUrl").unwrap();
        let after = r.morphology().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(*after, snapshot);
        assert_eq!(after.keyphrase_forms.len(), 1);
        assert_eq!(after.keyphrase_forms[0][0], "pop-art");
    });
}

#[test]
fn dependencies_resolve_regardless_of_call_order() {
    let paper = Paper::new("Pop art is fun. I love pop art.").with_keyword("pop art");
    run(&paper, |r| {
        let density = r.get_research("getKeywordDensity").unwrap();
        assert!(density.as_keyword_density().unwrap().density > 0.0);
        let count = r.research(Research::KeyphraseCount).unwrap();
        assert_eq!(count.as_keyphrase_count().unwrap().count, 2);
    });
}

#[test]
fn unknown_research_is_an_error() {
    let paper = Paper::new("");
    run(&paper, |r| {
        let err = r.get_research("doesNotExist").unwrap_err();
        assert_eq!(err, ResearchError::UnknownResearch("doesNotExist".to_string()));
    });
}

#[test]
fn unregistered_research_is_an_error() {
    let paper = Paper::new("");
    let config = MorphologyConfig::builtin();
    let registry = ResearchRegistry::empty();
    let researcher = Researcher::new(&paper, &config, &registry);
    assert!(matches!(
        researcher.research(Research::Morphology),
        Err(ResearchError::UnknownResearch(_))
    ));
}

#[test]
fn unsupported_locale_falls_back_to_literal_words() {
    let paper = Paper::new("")
        .with_keyword("Pop Arts")
        .with_locale("xx_XX");
    run(&paper, |r| {
        let forms = r.morphology().unwrap();
        assert_eq!(
            forms.keyphrase_forms,
            vec![vec!["pop".to_string()], vec!["arts".to_string()]]
        );
    });
}

/// Counts WARN events seen while installed.
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn unsupported_locale_warns_once_per_run() {
    let warnings = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));
    let paper = Paper::new("Pop art is fun.")
        .with_title("Pop art")
        .with_keyword("pop art")
        .with_locale("xx_XX");

    tracing::subscriber::with_default(subscriber, || {
        run(&paper, |r| {
            assert!(r.locale_rules().is_none());
            assert!(r.locale_rules().is_none());
            r.research(Research::KeyphraseLength).unwrap();
            r.research(Research::FindKeyphraseInSeoTitle).unwrap();
        });
        assert_eq!(warnings.load(Ordering::SeqCst), 1);

        run(&paper, |r| {
            r.locale_rules();
        });
        assert_eq!(warnings.load(Ordering::SeqCst), 2);
    });
}

#[test]
fn english_forms_include_plurals() {
    let paper = Paper::new("").with_keyword("gallery");
    run(&paper, |r| {
        let forms = r.morphology().unwrap();
        assert!(forms.keyphrase_forms[0].contains(&"galleries".to_string()));
    });
}

#[test]
fn keyphrase_count_and_density() {
    let paper = Paper::new("<p>Pop art is fun.</p> I love pop art and pop arts. Nothing here.")
        .with_keyword("pop art");
    run(&paper, |r| {
        let count = r.research(Research::KeyphraseCount).unwrap();
        let count = count.as_keyphrase_count().unwrap();
        assert_eq!(count.count, 3);
        assert_eq!(count.markings.len(), 2);

        let words = r.research(Research::WordCountInText).unwrap();
        assert_eq!(words.as_word_count().unwrap().count, 13);

        let density = r.research(Research::KeywordDensity).unwrap();
        let density = density.as_keyword_density().unwrap().density;
        assert!((density - 300.0 / 13.0).abs() < 1e-9);
    });
}

#[test]
fn shorter_words_are_not_counted_as_forms() {
    let paper = Paper::new("New shoes are new. Old news.").with_keyword("news");
    run(&paper, |r| {
        let count = r.research(Research::KeyphraseCount).unwrap();
        assert_eq!(count.as_keyphrase_count().unwrap().count, 1);
    });
}

#[test]
fn double_s_keyphrase_matches_its_plural() {
    let paper = Paper::new("Two classes met. One class stayed.").with_keyword("class");
    run(&paper, |r| {
        let forms = r.morphology().unwrap();
        assert!(forms.keyphrase_forms[0].contains(&"classes".to_string()));
        assert!(!forms.keyphrase_forms[0].contains(&"clas".to_string()));
        let count = r.research(Research::KeyphraseCount).unwrap();
        assert_eq!(count.as_keyphrase_count().unwrap().count, 2);
    });
}

#[test]
fn synonyms_count_when_keyphrase_is_absent() {
    let paper = Paper::new("Modern art fills the room. Modern art again.")
        .with_keyword("gallery")
        .with_synonyms(["modern art"]);
    run(&paper, |r| {
        let count = r.research(Research::KeyphraseCount).unwrap();
        assert_eq!(count.as_keyphrase_count().unwrap().count, 2);
    });
}

#[test]
fn keyphrase_in_title() {
    let title_match = |title: &str, keyword: &str| {
        let paper = Paper::new("").with_title(title).with_keyword(keyword);
        run(&paper, |r| {
            *r.research(Research::FindKeyphraseInSeoTitle)
                .unwrap()
                .as_title_match()
                .unwrap()
        })
    };

    let leading = title_match("The Pop Art Guide", "pop art");
    assert!(leading.exact_match_found);
    assert_eq!(leading.position, Some(0));

    let later = title_match("Guide to pop art", "pop art");
    assert!(later.exact_match_found);
    assert_eq!(later.position, Some(9));

    let dotted = title_match("\u{130}stanbul pop art", "pop art");
    assert!(dotted.exact_match_found);
    assert_eq!(dotted.position, Some(9));

    let scrambled = title_match("Art of the pop era", "pop art");
    assert!(!scrambled.exact_match_found);
    assert!(scrambled.all_words_found);
    assert_eq!(scrambled.position, None);

    let quoted = title_match("Art of the pop era", "\"pop art\"");
    assert!(quoted.exact_match_keyphrase);
    assert!(!quoted.all_words_found);
}

#[test]
fn keyphrase_length_reports_function_words() {
    let paper = Paper::new("").with_keyword("the art of war");
    run(&paper, |r| {
        let result = r.research(Research::KeyphraseLength).unwrap();
        let length = result.as_keyphrase_length().unwrap();
        assert_eq!(length.keyphrase_length, 2);
        assert_eq!(length.function_words, vec!["the", "of"]);
    });
}

#[test]
fn meta_description_counts_occurrences() {
    let paper = Paper::new("")
        .with_keyword("pop art")
        .with_description("Pop art explained. More pop art here, and pop art again.");
    run(&paper, |r| {
        let result = r.research(Research::MetaDescriptionKeyword).unwrap();
        assert_eq!(result.as_meta_description_keyword().unwrap().count, 3);
    });
}

#[test]
fn sentence_lengths() {
    let long = vec!["word"; 25].join(" ");
    let paper = Paper::new(format!("{long}. Five words are right here."));
    run(&paper, |r| {
        let result = r.research(Research::SentenceLengthInText).unwrap();
        let lengths = result.as_sentence_lengths().unwrap();
        assert_eq!(lengths.sentences.len(), 2);
        assert_eq!(lengths.sentences[0].word_count, 25);
        assert_eq!(lengths.sentences[1].word_count, 5);
        assert_eq!(lengths.average_length, 15.0);
        assert_eq!(lengths.long_sentence_percentage, 50.0);
    });
}

#[test]
fn cjk_word_count_uses_characters() {
    let paper = Paper::new("東京タワーは高い。").with_locale("ja");
    run(&paper, |r| {
        let result = r.research(Research::WordCountInText).unwrap();
        let count = result.as_word_count().unwrap();
        assert_eq!(count.count, 8);
    });
}

#[test]
fn registration_validates_dependencies() {
    fn noop(_: &Paper, r: &Researcher<'_>) -> Result<ResearchResult, ResearchError> {
        r.research(Research::Morphology).map(|result| (*result).clone())
    }

    let mut registry = ResearchRegistry::empty();
    let err = registry
        .register(Research::KeywordCountInUrl, noop)
        .unwrap_err();
    assert_eq!(
        err,
        ResearchError::MissingDependency {
            research: "keywordCountInUrl".to_string(),
            dependency: "morphology".to_string(),
        }
    );

    registry.register(Research::Morphology, noop).unwrap();
    assert!(matches!(
        registry.register(Research::Morphology, noop),
        Err(ResearchError::DuplicateResearch(_))
    ));

    // The morphology entry above asks for itself.
    let paper = Paper::new("");
    let config = MorphologyConfig::empty();
    let researcher = Researcher::new(&paper, &config, &registry);
    assert!(matches!(
        researcher.research(Research::Morphology),
        Err(ResearchError::DependencyCycle(_))
    ));
}

#[test]
fn analysis_reports_every_research() {
    let paper = Paper::new("Some text about pop art.")
        .with_keyword("pop art")
        .with_locale("fr_FR");
    let report = analyze(&paper, &MorphologyConfig::builtin()).unwrap();
    for research in Research::ALL {
        assert!(report.results.contains_key(research.name()), "{research} missing");
    }
}

#[test]
fn json_output_is_valid() {
    let paper: Paper = serde_json::from_str(
        r#"{
            "text": "Pop art is fun.",
            "title": "Pop art",
            "slug": "pop-art",
            "keyword": "pop art",
            "synonyms": "modern art, street art"
        }"#,
    )
    .unwrap();
    assert_eq!(paper.locale(), "en_US");
    assert_eq!(paper.synonyms().to_vec(), vec!["modern art", "street art"]);

    let report = analyze(&paper, &MorphologyConfig::builtin()).unwrap();
    let json = serde_json::to_string_pretty(&report).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let results = &parsed["results"];
    assert_eq!(results["keywordCountInUrl"]["percentWordMatches"], 100.0);
    assert_eq!(results["keywordCountInUrl"]["keyphraseLength"], 2);
    assert!(results["morphology"]["keyphraseForms"].is_array());
    assert_eq!(results["morphology"]["synonymsForms"].as_array().unwrap().len(), 2);
    assert_eq!(results["wordCountInText"]["unit"], "word");
}

#[test]
fn custom_rules_from_json() {
    let config = MorphologyConfig::builtin()
        .merged_with(
            MorphologyConfig::from_json_str(
                r#"{"locales": {"nl_NL": {"suffixes": [{"strip": "en"}], "min_stem_length": 2}}}"#,
            )
            .unwrap(),
        );
    let paper = Paper::new("")
        .with_keyword("boeken")
        .with_slug("mijn-boek")
        .with_locale("nl_NL");
    let registry = ResearchRegistry::with_defaults();
    let researcher = Researcher::new(&paper, &config, &registry);
    let forms = researcher.morphology().unwrap();
    assert_eq!(forms.keyphrase_forms[0], vec!["boeken", "boek"]);
    let result = researcher.get_research("keywordCountInSlug").unwrap();
    assert_eq!(result.as_keyphrase_in_slug().unwrap().percent_word_matches, 100.0);
}
