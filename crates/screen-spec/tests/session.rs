use std::time::{Duration, Instant};

use serde_json::{Value, json};

use screen_spec::{
    AnswerMap, AutoAdvance, QuestionnaireSpec, ScreenHost, ScreenSession, ScreenSpec, ScreenType,
    SubmitOutcome,
};

#[derive(Default)]
struct RecordingHost {
    answers: AnswerMap,
    submitted: usize,
}

impl ScreenHost for RecordingHost {
    fn update_answer(&mut self, field_id: &str, value: Value) {
        self.answers.insert(field_id, value);
    }

    fn submit(&mut self) {
        self.submitted += 1;
    }
}

fn intake() -> QuestionnaireSpec {
    QuestionnaireSpec::from_json(include_str!("fixtures/intake.json")).expect("fixture")
}

#[test]
fn blur_records_error_and_change_clears_it() {
    let spec = intake();
    let screen = spec.screen("account").expect("screen");
    let mut session = ScreenSession::new(screen);
    let mut host = RecordingHost::default();
    let now = Instant::now();

    session.on_change(&mut host, "email", json!("nope"), now);
    assert_eq!(
        session.on_blur("email", &host.answers),
        Some("Please enter a valid email address.")
    );
    assert!(session.errors().contains("email"));

    session.on_change(&mut host, "email", json!("pat@example.com"), now);
    assert!(!session.errors().contains("email"));
    assert_eq!(session.on_blur("email", &host.answers), None);
}

#[test]
fn submit_only_calls_host_when_valid() {
    let spec = intake();
    let screen = spec.screen("consent").expect("screen");
    let mut session = ScreenSession::new(screen);
    let mut host = RecordingHost::default();

    assert!(!session.can_continue(&host.answers));
    let answers = host.answers.clone();
    assert_eq!(
        session.on_submit(&mut host, &answers),
        SubmitOutcome::Blocked { errors: 1 }
    );
    assert_eq!(host.submitted, 0);
    assert_eq!(
        session.errors().get("consent_telehealth"),
        Some("This consent is required to continue.")
    );

    session.on_change(&mut host, "consent_telehealth", json!(true), Instant::now());
    assert!(session.can_continue(&host.answers));
    let answers = host.answers.clone();
    assert_eq!(session.on_submit(&mut host, &answers), SubmitOutcome::Submitted);
    assert_eq!(host.submitted, 1);
    assert!(session.errors().is_empty());
}

#[test]
fn auto_advance_fires_after_delay() {
    let spec = intake();
    let screen = spec.screen("goal").expect("screen");
    let mut session = ScreenSession::new(screen);
    let mut host = RecordingHost::default();
    let start = Instant::now();

    session.on_change(&mut host, "goal", json!("lose_weight"), start);
    assert_eq!(
        session.pending_advance(),
        Some(start + Duration::from_millis(300))
    );

    let answers = host.answers.clone();
    assert_eq!(
        session.poll(&mut host, &answers, start + Duration::from_millis(100)),
        None
    );
    assert_eq!(host.submitted, 0);

    assert_eq!(
        session.poll(&mut host, &answers, start + Duration::from_millis(300)),
        Some(SubmitOutcome::Submitted)
    );
    assert_eq!(host.submitted, 1);
    assert_eq!(session.pending_advance(), None);
}

#[test]
fn newer_selection_supersedes_pending_advance() {
    let spec = intake();
    let screen = spec.screen("goal").expect("screen");
    let mut session = ScreenSession::new(screen);
    let mut host = RecordingHost::default();
    let start = Instant::now();

    session.on_change(&mut host, "goal", json!("lose_weight"), start);
    session.on_change(&mut host, "goal", json!(""), start + Duration::from_millis(200));
    assert_eq!(session.pending_advance(), None);

    let answers = host.answers.clone();
    assert_eq!(
        session.poll(&mut host, &answers, start + Duration::from_millis(400)),
        None
    );

    let later = start + Duration::from_millis(250);
    session.on_change(&mut host, "goal", json!("maintain_weight"), later);
    assert_eq!(
        session.pending_advance(),
        Some(later + Duration::from_millis(300))
    );
}

#[test]
fn multi_select_advances_only_on_listed_values() {
    let mut screen = ScreenSpec::new("symptoms", ScreenType::MultiSelect);
    screen.options = vec!["nausea".into(), "fatigue".into(), "none".into()];
    screen.auto_advance = Some(AutoAdvance {
        delay_ms: 500,
        on_values: vec!["none".into()],
    });
    let mut session = ScreenSession::new(&screen);
    let mut host = RecordingHost::default();
    let start = Instant::now();

    session.on_change(&mut host, "symptoms", json!(["nausea"]), start);
    assert_eq!(session.pending_advance(), None);

    session.on_change(&mut host, "symptoms", json!(["none"]), start);
    assert_eq!(
        session.pending_advance(),
        Some(start + Duration::from_millis(500))
    );
}

#[test]
fn blocked_auto_advance_surfaces_errors() {
    let mut screen = ScreenSpec::new("pick", ScreenType::SingleSelect);
    screen.options = vec!["a".into()];
    screen.auto_advance = Some(AutoAdvance {
        delay_ms: 10,
        on_values: Vec::new(),
    });
    let mut session = ScreenSession::new(&screen);
    let mut host = RecordingHost::default();
    let start = Instant::now();

    session.on_change(&mut host, "pick", json!("a"), start);
    // The host lost the answer before the timer fired.
    let empty = AnswerMap::new();
    assert_eq!(
        session.poll(&mut host, &empty, start + Duration::from_millis(10)),
        Some(SubmitOutcome::Blocked { errors: 1 })
    );
    assert_eq!(session.errors().get("pick"), Some("This field is required."));
    assert_eq!(host.submitted, 0);
}
