use pretty_assertions::assert_eq;
use wp_core::{
    error::ServiceError,
    service::{LanguageModelService, ModelClass, PredictOptions},
};
use wp_model::{MemoryModel, ModelError, memory::NUMBER_TOKEN};

const WORDS: &str = "\
# word\tcount
the\t500
fox\t40
foxes\t12
fond\t12
found\t60
café\t5
Paris\t30
";

fn engine() -> MemoryModel {
    MemoryModel::from_tsv_str("sys", WORDS)
        .unwrap()
        .with_model("usr", ModelClass::User)
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn options(case_sensitive: bool, accent_sensitive: bool) -> PredictOptions {
    PredictOptions {
        case_sensitive,
        accent_sensitive,
        limit: 10,
    }
}

#[test]
fn ranks_by_frequency_then_alphabet() {
    let mut engine = engine();
    let predictions = engine
        .predict(&names(&["sys"]), "the f", options(true, true))
        .unwrap();
    assert_eq!(predictions, vec!["found", "fox", "fond", "foxes"]);
}

#[test]
fn limit_is_honoured() {
    let mut engine = engine();
    let predictions = engine
        .predict(
            &names(&["sys"]),
            "the f",
            PredictOptions {
                limit: 2,
                ..options(true, true)
            },
        )
        .unwrap();
    assert_eq!(predictions, vec!["found", "fox"]);
}

#[test]
fn completed_word_is_not_predicted_again() {
    let mut engine = engine();
    let predictions = engine
        .predict(&names(&["sys"]), "a fox", options(true, true))
        .unwrap();
    assert_eq!(predictions, vec!["foxes"]);
}

#[test]
fn case_and_accent_folding() {
    let mut engine = engine();
    let models = names(&["sys"]);
    assert!(engine.predict(&models, "in par", options(true, true)).unwrap().is_empty());
    assert_eq!(
        engine.predict(&models, "in par", options(false, true)).unwrap(),
        vec!["Paris"]
    );
    assert!(engine.predict(&models, "a cafe", options(true, true)).unwrap().is_empty());
    assert_eq!(
        engine.predict(&models, "a cafe", options(true, false)).unwrap(),
        vec!["café"]
    );
}

#[test]
fn learned_bigrams_outrank_frequency() {
    let mut engine = engine();
    let models = names(&["sys", "usr"]);
    engine
        .learn_text(&names(&["usr"]), "quick brown foxes", true)
        .unwrap();
    assert_eq!(engine.count("usr", "foxes"), 1);
    assert_eq!(engine.bigram_count("usr", "brown", "foxes"), 1);

    let predictions = engine.predict(&models, "brown f", options(true, true)).unwrap();
    assert_eq!(predictions[0], "foxes");
    let predictions = engine.predict(&models, "red f", options(true, true)).unwrap();
    assert_eq!(predictions[0], "found");
}

#[test]
fn learning_without_new_words() {
    let mut engine = engine();
    let usr = names(&["usr"]);
    engine.learn_text(&usr, "hello", true).unwrap();
    engine.learn_text(&usr, "hello world 42", false).unwrap();
    assert_eq!(engine.count("usr", "hello"), 2);
    assert_eq!(engine.count("usr", "world"), 0);
    assert_eq!(engine.count("usr", "42"), 0);
}

#[test]
fn system_models_are_read_only() {
    let mut engine = engine();
    let err = engine.learn_text(&names(&["sys"]), "fox", true).unwrap_err();
    assert!(matches!(err, ServiceError::Call { method: "learn_text", .. }));
    assert!(!err.is_connection());
}

#[test]
fn unknown_model_is_a_call_error() {
    let mut engine = engine();
    let err = engine
        .predict(&names(&["nope"]), "f", options(true, true))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Call { method: "predict", .. }));
}

#[test]
fn lookup_reports_exact_partial_and_numbers() {
    let mut engine = engine();
    let entries = engine
        .lookup_text(&names(&["sys", "usr"]), "The fo zzz 3.5")
        .unwrap();
    let summary: Vec<(&str, Vec<i32>)> = entries
        .iter()
        .map(|e| (e.token.as_str(), e.counts.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("The", vec![1, 0]),
            ("fo", vec![-4, 0]),
            ("zzz", vec![0, 0]),
            (NUMBER_TOKEN, vec![0, 0]),
        ]
    );
    assert_eq!((entries[1].begin, entries[1].end), (4, 6));
}

#[test]
fn model_names_by_class() {
    let mut engine = engine();
    assert_eq!(engine.model_names(ModelClass::System).unwrap(), vec!["sys"]);
    assert_eq!(engine.model_names(ModelClass::User).unwrap(), vec!["usr"]);
}

#[test]
fn bad_word_list_reports_line() {
    let err = MemoryModel::from_tsv_str("sys", "fox\t1\n\nfoxes\tmany\n").unwrap_err();
    match err {
        ModelError::Parse { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let err = MemoryModel::from_path("sys", "/definitely/not/here.tsv").unwrap_err();
    assert!(matches!(err, ModelError::Io(_)));
}

#[test]
fn count_defaults_to_one() {
    let engine = MemoryModel::from_tsv_str("sys", "fox\nfox\t2\n").unwrap();
    assert_eq!(engine.count("sys", "fox"), 3);
    assert_eq!(engine.vocabulary().get("fox"), Some(&3));
}
