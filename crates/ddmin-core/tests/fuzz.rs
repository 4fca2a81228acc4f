use ddmin_core::{ddmin, evaluate, infallible, FuzzConfig, Fuzzer, Outcome};

#[test]
fn tiny_max_length_always_generates_empty_strings() {
    for max_length in [0, 1] {
        let config = FuzzConfig {
            max_length,
            ..FuzzConfig::default()
        };
        let samples: Vec<String> = Fuzzer::new(config, 17)
            .take(100)
            .collect::<Result<_, _>>()
            .expect("samples");
        assert!(samples.iter().all(String::is_empty));
    }
}

#[test]
fn evaluation_of_default_fuzzer_is_bounded() {
    let mut fuzzer = Fuzzer::new(FuzzConfig::default(), 2024);
    let evaluation = evaluate(100, || fuzzer.generate()).expect("evaluate");

    assert!(evaluation.max_length < 100);
    assert!(evaluation.average_length >= 0.0);
    assert!(evaluation.average_length <= evaluation.max_length as f64);
}

#[test]
fn fuzzed_sample_with_trigger_char_minimizes_to_that_char() {
    // '(' is inside the default range [32, 64).
    let sample = Fuzzer::new(FuzzConfig::default(), 99)
        .map(|sample| sample.expect("sample"))
        .find(|sample| sample.contains('('))
        .expect("a sample containing '('");
    let input: Vec<char> = sample.chars().collect();

    let output = ddmin(
        &input,
        infallible(|candidate: &[char]| {
            if candidate.contains(&'(') {
                Outcome::Fail
            } else {
                Outcome::Pass
            }
        }),
    )
    .expect("ddmin");

    assert_eq!(output, vec!['(']);
}

#[test]
fn evaluation_serializes_with_original_field_names() {
    let mut fuzzer = Fuzzer::new(FuzzConfig::default(), 1);
    let evaluation = evaluate(10, || fuzzer.generate()).expect("evaluate");
    let json = serde_json::to_value(evaluation).expect("json");

    assert!(json["average_length"].is_f64());
    assert!(json["max_length"].is_u64());
}
