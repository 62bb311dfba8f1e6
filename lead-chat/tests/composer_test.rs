use chrono::{TimeZone, Utc};
use lead_chat::composer::{Key, KeyOutcome, KeyPress, MentionComposer, PickerTrigger, PickerView};
use lead_chat::models::{CandidateLead, ChatMessage, MessageId, SenderType};
use lead_chat::services::tagged_leads;
use mention_protocol::{parse, Segment};

fn composer(leads: Vec<CandidateLead>) -> MentionComposer {
    let mut composer = MentionComposer::new(PickerTrigger::BareAt);
    let picker = composer.picker_mut();
    let ticket = picker.begin_load();
    picker.finish_load(ticket, Ok(leads));
    composer
}

#[test]
fn test_compose_mention_scenario() {
    let mut composer = composer(vec![
        CandidateLead::new(7, "Bolt Ltd"),
        CandidateLead::new(42, "Acme Co"),
    ]);

    composer.on_change("Hello ", 6);
    assert!(!composer.picker().is_open());

    composer.on_change("Hello @", 7);
    assert!(composer.picker().is_open());
    assert!(matches!(
        composer.picker().view(),
        PickerView::Results { selected: 0, .. }
    ));

    assert_eq!(composer.handle_key(KeyPress::new(Key::ArrowDown)), KeyOutcome::Handled);
    assert_eq!(composer.handle_key(KeyPress::new(Key::Enter)), KeyOutcome::Handled);

    assert_eq!(composer.text(), "Hello @[42:Acme Co] ");
    assert_eq!(composer.cursor(), composer.text().len());
    assert!(!composer.picker().is_open());

    // the inserted token does not re-arm the picker
    let text = composer.text().to_string();
    composer.on_change(text.clone(), text.len());
    assert!(!composer.picker().is_open());

    match composer.handle_key(KeyPress::new(Key::Enter)) {
        KeyOutcome::Submit(body) => {
            let mentions: Vec<_> = parse(&body).filter(Segment::is_mention).collect();
            assert_eq!(mentions.len(), 1);
            assert_eq!(
                mentions[0],
                Segment::Mention {
                    lead_id: 42,
                    lead_name: "Acme Co",
                    raw: "@[42:Acme Co]"
                }
            );
        }
        other => panic!("expected submit, got {other:?}"),
    }
}

#[test]
fn test_escape_keeps_text_and_enter_then_submits() {
    let mut composer = composer(vec![CandidateLead::new(1, "Only")]);
    composer.on_change("ping @", 6);

    assert_eq!(composer.handle_key(KeyPress::new(Key::Escape)), KeyOutcome::Handled);
    assert_eq!(composer.text(), "ping @");
    assert!(!composer.picker().is_open());

    assert_eq!(
        composer.handle_key(KeyPress::new(Key::Enter)),
        KeyOutcome::Submit("ping @".into())
    );
}

#[test]
fn test_enter_with_no_candidates_closes_picker() {
    let mut composer = composer(Vec::new());
    composer.on_change("@", 1);
    assert_eq!(composer.picker().view(), PickerView::NoResults);

    assert_eq!(composer.handle_key(KeyPress::new(Key::Enter)), KeyOutcome::Handled);
    assert_eq!(composer.text(), "@");
    assert!(!composer.picker().is_open());
}

#[test]
fn test_malformed_token_renders_as_text() {
    let body = "see @[abc:Acme] and @[42:] and @[42:Acme Co]";
    let segments: Vec<_> = parse(body).collect();

    assert_eq!(
        segments,
        vec![
            Segment::Text("see @[abc:Acme] and @[42:] and "),
            Segment::Mention {
                lead_id: 42,
                lead_name: "Acme Co",
                raw: "@[42:Acme Co]"
            },
        ]
    );
}

#[test]
fn test_tagged_leads_from_composed_messages() {
    let message = |id: i64, body: &str| ChatMessage {
        id: MessageId::from(id),
        sender_type: SenderType::Business,
        body: body.to_string(),
        created_at: Utc.timestamp_opt(1_714_550_400 + id, 0).unwrap(),
    };

    let messages = vec![
        message(1, "@[42:Acme Co] first"),
        message(2, "@[7:Bolt] then @[42:Acme Corp]"),
    ];
    let tagged = tagged_leads(&messages);

    assert_eq!(tagged.len(), 2);
    assert_eq!(tagged[0].lead_id, 42);
    assert_eq!(tagged[0].lead_name, "Acme Corp");
    assert_eq!(tagged[0].mention_count, 2);
    assert_eq!(tagged[1].lead_id, 7);
}
