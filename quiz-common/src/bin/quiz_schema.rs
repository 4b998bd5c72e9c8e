// ABOUTME: emits a json schema for the weekly quiz document to stdout.
// ABOUTME: intended for the consuming application and for external validators.

fn main() {
    let schema = schemars::schema_for!(quiz_common::QuizDocument);
    let json = serde_json::to_string_pretty(&schema).expect("serialize schema");
    println!("{json}");
}
