use std::time::Duration;

use tokio::sync::mpsc;

use mob_sort::sort::{
    ChoicePrompt, DecisionChannel, DecisionError, DecisionPresenter, PresentError, Side,
    SortSession, TriggerOutcome,
};
use mob_sort::{run_sort_with_trace, Record};

/// Hands prompts to another task, the way a UI event loop would receive them.
struct Forwarding {
    tx: mpsc::UnboundedSender<ChoicePrompt>,
}

#[async_trait::async_trait]
impl DecisionPresenter for Forwarding {
    async fn present(&self, prompt: ChoicePrompt) -> Result<(), PresentError> {
        self.tx
            .send(prompt)
            .map_err(|_| PresentError::Message("mob went home".into()))
    }
}

fn card(value: &str) -> Record {
    Record::subject_only("Movie Title", value)
}

#[tokio::test]
async fn remote_mob_resolves_each_choice() {
    let (tx, mut rx) = mpsc::unbounded_channel::<ChoicePrompt>();
    let presenter = Forwarding { tx };

    let mob = tokio::spawn(async move {
        let mut answered = 0u64;
        while let Some(prompt) = rx.recv().await {
            let left = prompt.left.subject().display_value();
            let side = if left <= prompt.right.subject().display_value() {
                Side::Left
            } else {
                Side::Right
            };
            // A double tap on the winner and a late tap on the loser change nothing.
            assert_eq!(prompt.handle(side).trigger(), TriggerOutcome::Resolved(side));
            assert_eq!(prompt.handle(side).trigger(), TriggerOutcome::Stale);
            let loser = match side {
                Side::Left => Side::Right,
                Side::Right => Side::Left,
            };
            assert_eq!(prompt.handle(loser).trigger(), TriggerOutcome::Stale);
            answered += 1;
        }
        answered
    });

    let input = vec![
        card("Goblet of Fire"),
        card("Chamber of Secrets"),
        card("Order of the Phoenix"),
        card("Sorcerer's Stone"),
        card("Prisoner of Azkaban"),
    ];
    let resp = run_sort_with_trace(input, &presenter, None, None)
        .await
        .unwrap();
    drop(presenter);

    let answered = mob.await.unwrap();
    assert_eq!(answered, resp.meta.decisions_made);
    let titles: Vec<String> = resp
        .ranked
        .iter()
        .map(|r| r.record.subject().display_value())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Chamber of Secrets",
            "Goblet of Fire",
            "Order of the Phoenix",
            "Prisoner of Azkaban",
            "Sorcerer's Stone",
        ]
    );
}

#[tokio::test]
async fn presenter_failure_surfaces_and_frees_the_channel() {
    let (tx, rx) = mpsc::unbounded_channel::<ChoicePrompt>();
    drop(rx);
    let presenter = Forwarding { tx };
    let channel = DecisionChannel::new(&presenter);
    let mut session = SortSession::new(1.0);

    let err = channel
        .request(&mut session, &card("a"), &card("b"))
        .await
        .unwrap_err();
    assert!(matches!(err, DecisionError::Presenter(_)));
    assert!(!channel.is_pending());
    assert_eq!(session.decisions_made(), 0);
}

#[tokio::test]
async fn close_from_elsewhere_abandons_a_waiting_request() {
    let (tx, mut rx) = mpsc::unbounded_channel::<ChoicePrompt>();
    let presenter = Forwarding { tx };
    let channel = DecisionChannel::new(&presenter);
    let mut session = SortSession::new(1.0);

    let (a, b) = (card("a"), card("b"));
    let request = channel.request(&mut session, &a, &b);
    let closer = async {
        let prompt = rx.recv().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        channel.close();
        prompt
    };
    let (result, prompt) = tokio::join!(request, closer);

    assert!(matches!(result, Err(DecisionError::Abandoned)));
    assert_eq!(prompt.left_handle.trigger(), TriggerOutcome::Stale);
    assert_eq!(session.decisions_made(), 0);
}
