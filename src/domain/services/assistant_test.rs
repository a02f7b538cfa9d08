use anyhow::anyhow;
use anyhow::Result;

use super::LegalAssistant;
use crate::domain::models::AssistantError;
use crate::domain::models::ChatMessage;
use crate::domain::models::ChatRole;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::SYSTEM_INSTRUCTION;
use crate::domain::services::test_doubles::ScriptedBackend;
use crate::domain::services::History;

fn roles(assistant: &LegalAssistant) -> Vec<Role> {
    return assistant
        .history()
        .all()
        .iter()
        .map(|message| return message.role())
        .collect();
}

#[tokio::test]
async fn it_processes_a_case() -> Result<()> {
    let backend = ScriptedBackend::new(vec![Ok("The lease was void.".to_string())]);
    let requests = backend.requests.clone();
    let mut assistant = LegalAssistant::new(Box::new(backend));

    let res = assistant.process_legal_case("Lease dispute text").await?;

    assert_eq!(res, "The lease was void.");
    assert_eq!(
        assistant.history().all(),
        &[
            Message::human("Lease dispute text"),
            Message::assistant("The lease was void."),
        ]
    );
    assert_eq!(
        requests.lock().unwrap()[0],
        vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::human("Lease dispute text"),
        ]
    );

    return Ok(());
}

#[tokio::test]
async fn it_does_not_replay_history_for_new_cases() -> Result<()> {
    let backend = ScriptedBackend::new(vec![
        Ok("First summary".to_string()),
        Ok("Second summary".to_string()),
    ]);
    let requests = backend.requests.clone();
    let mut assistant = LegalAssistant::new(Box::new(backend));

    assistant.process_legal_case("First case").await?;
    assistant.process_legal_case("Second case").await?;

    assert_eq!(
        requests.lock().unwrap()[1],
        vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::human("Second case"),
        ]
    );
    assert_eq!(assistant.history().len(), 4);

    return Ok(());
}

#[tokio::test]
async fn it_rejects_empty_cases() {
    let mut assistant = LegalAssistant::new(Box::new(ScriptedBackend::new(vec![])));

    let res = assistant.process_legal_case(" \n\t").await;

    assert!(matches!(res, Err(AssistantError::Validation(_))));
    assert!(assistant.history().is_empty());
}

#[tokio::test]
async fn it_keeps_the_case_when_the_model_fails() {
    let backend = ScriptedBackend::new(vec![Err(anyhow!("503 Service Unavailable"))]);
    let mut assistant = LegalAssistant::new(Box::new(backend));

    let res = assistant.process_legal_case("Contract case").await;

    assert!(matches!(res, Err(AssistantError::ModelBackend(_))));
    assert_eq!(assistant.history().all(), &[Message::human("Contract case")]);
}

#[tokio::test]
async fn it_passes_unexpected_response_types_through() {
    let backend = ScriptedBackend::new(vec![Err(AssistantError::UnexpectedResponseType(
        "no candidates".to_string(),
    )
    .into())]);
    let mut assistant = LegalAssistant::new(Box::new(backend));

    let res = assistant.answer_question("Is this binding?").await;

    assert!(matches!(
        res,
        Err(AssistantError::UnexpectedResponseType(reason)) if reason == "no candidates"
    ));
    assert_eq!(roles(&assistant), vec![Role::Human]);
}

#[tokio::test]
async fn it_answers_questions_with_full_history() -> Result<()> {
    let backend = ScriptedBackend::new(vec![
        Ok("Summary".to_string()),
        Ok("First answer".to_string()),
        Ok("Second answer".to_string()),
    ]);
    let requests = backend.requests.clone();
    let mut assistant = LegalAssistant::new(Box::new(backend));

    assistant.process_legal_case("Case").await?;
    assistant.answer_question("First question").await?;
    let res = assistant.answer_question("Second question").await?;

    assert_eq!(res, "Second answer");

    let last_request = requests.lock().unwrap()[2].clone();
    assert_eq!(last_request.len(), 6);
    assert_eq!(last_request[0], ChatMessage::system(SYSTEM_INSTRUCTION));
    assert_eq!(
        last_request
            .iter()
            .skip(1)
            .map(|message| return (message.role, message.content.as_str()))
            .collect::<Vec<_>>(),
        vec![
            (ChatRole::Human, "Case"),
            (ChatRole::Assistant, "Summary"),
            (ChatRole::Human, "First question"),
            (ChatRole::Assistant, "First answer"),
            (ChatRole::Human, "Second question"),
        ]
    );
    assert_eq!(
        roles(&assistant),
        vec![
            Role::Human,
            Role::Assistant,
            Role::Human,
            Role::Assistant,
            Role::Human,
            Role::Assistant,
        ]
    );

    return Ok(());
}

#[tokio::test]
async fn it_rejects_empty_questions_without_touching_history() -> Result<()> {
    let backend = ScriptedBackend::new(vec![Ok("Summary".to_string())]);
    let requests = backend.requests.clone();
    let mut assistant = LegalAssistant::new(Box::new(backend));
    assistant.process_legal_case("Case").await?;

    let res = assistant.answer_question("   ").await;

    assert!(matches!(res, Err(AssistantError::Validation(_))));
    assert_eq!(assistant.history().len(), 2);
    assert_eq!(requests.lock().unwrap().len(), 1);

    return Ok(());
}

#[tokio::test]
async fn it_answers_from_restored_history() -> Result<()> {
    let backend = ScriptedBackend::new(vec![Ok("Yes.".to_string())]);
    let requests = backend.requests.clone();
    let mut assistant = LegalAssistant::new(Box::new(backend));
    let records = History::parse_json(
        r#"[{"type": "human", "content": "Old case"}, {"type": "ai", "content": "Old summary"}]"#,
    )?;
    assistant.history_mut().load(records)?;

    assistant.answer_question("Still good law?").await?;

    assert_eq!(
        requests.lock().unwrap()[0],
        vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::human("Old case"),
            ChatMessage {
                role: ChatRole::Assistant,
                content: "Old summary".to_string(),
            },
            ChatMessage::human("Still good law?"),
        ]
    );

    return Ok(());
}
