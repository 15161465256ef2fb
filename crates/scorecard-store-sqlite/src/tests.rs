//! Integration tests for `SqliteStore` against an in-memory database.

use scorecard_core::{
  answer::{NewAnswer, NewComment, Score},
  question::NewQuestion,
  session::{NewSession, SessionPatch},
  store::{EvalStore, ListQuery},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_session(name: &str) -> NewSession {
  NewSession {
    name:        name.to_owned(),
    description: Some("rag evaluation".to_owned()),
  }
}

fn new_question(text: &str) -> NewQuestion {
  NewQuestion {
    question_text:   text.to_owned(),
    expected_answer: None,
  }
}

/// Session with one chain, one configuration, and one question.
async fn seed_hierarchy(
  s: &SqliteStore,
) -> (Uuid, Uuid, Uuid, Uuid) {
  let session = s.insert_session(new_session("seed")).await.unwrap();
  let chains = s
    .insert_chains(session.session_id, vec!["rag_chain.py".to_owned()])
    .await
    .unwrap();
  let chain = &chains[0];
  let config = s
    .insert_configuration(session.session_id, chain.chain_id, Default::default())
    .await
    .unwrap();
  let question = s
    .insert_question(session.session_id, new_question("What is RAG?"))
    .await
    .unwrap();
  (
    session.session_id,
    chain.chain_id,
    config.configuration_id,
    question.question_id,
  )
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_session_roundtrip() {
  let s = store().await;

  let created = s.insert_session(new_session("baseline")).await.unwrap();
  let fetched = s.get_session(created.session_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_session_missing_returns_none() {
  let s = store().await;
  assert!(s.get_session(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_session_name_errors() {
  let s = store().await;
  s.insert_session(new_session("dup")).await.unwrap();
  assert!(s.insert_session(new_session("dup")).await.is_err());
}

#[tokio::test]
async fn list_sessions_orders_by_requested_column() {
  let s = store().await;
  let a = s.insert_session(new_session("a")).await.unwrap();
  let b = s.insert_session(new_session("b")).await.unwrap();

  // Touch `a` so it has the newest last_modified.
  s.update_session(a.session_id, SessionPatch {
    description: Some("touched".to_owned()),
    ..Default::default()
  })
  .await
  .unwrap();

  let listed = s
    .list_sessions(ListQuery {
      order_by: Some("last_modified".to_owned()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(listed[0].session_id, a.session_id);
  assert_eq!(listed[1].session_id, b.session_id);
}

#[tokio::test]
async fn list_sessions_unknown_column_falls_back() {
  let s = store().await;
  s.insert_session(new_session("only")).await.unwrap();

  // Must not fail; falls back to created_at.
  let listed = s
    .list_sessions(ListQuery {
      order_by: Some("no_such_column".to_owned()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn update_session_applies_partial_fields() {
  let s = store().await;
  let created = s.insert_session(new_session("before")).await.unwrap();

  let updated = s
    .update_session(created.session_id, SessionPatch {
      name: Some("after".to_owned()),
      description: None,
    })
    .await
    .unwrap()
    .unwrap();

  assert_eq!(updated.name, "after");
  assert_eq!(updated.description.as_deref(), Some("rag evaluation"));
  assert!(updated.last_modified >= created.last_modified);
}

#[tokio::test]
async fn update_missing_session_returns_none() {
  let s = store().await;
  let result = s
    .update_session(Uuid::new_v4(), SessionPatch::default())
    .await
    .unwrap();
  assert!(result.is_none());
}

// ─── Cascade delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_session_cascades_to_all_descendants() {
  let s = store().await;
  let (session_id, chain_id, configuration_id, question_id) =
    seed_hierarchy(&s).await;

  let answer = s
    .insert_answer(question_id, NewAnswer {
      chain_id,
      configuration_id,
      generated_answer: "generated".to_owned(),
      score: None,
    })
    .await
    .unwrap();
  let comment = s
    .insert_comment(answer.answer_id, NewComment {
      comment_text: "too terse".to_owned(),
    })
    .await
    .unwrap();

  assert!(s.delete_session(session_id).await.unwrap());

  assert!(s.get_chain(chain_id).await.unwrap().is_none());
  assert!(s.get_configuration(configuration_id).await.unwrap().is_none());
  assert!(s.get_question(question_id).await.unwrap().is_none());
  assert!(s.get_answer(answer.answer_id).await.unwrap().is_none());
  assert!(s.get_comment(comment.comment_id).await.unwrap().is_none());
}

// ─── Chains ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_chains_skips_conflicting_rows() {
  let s = store().await;
  let session = s.insert_session(new_session("chains")).await.unwrap();

  let first = s
    .insert_chains(session.session_id, vec![
      "a.py".to_owned(),
      "b.py".to_owned(),
    ])
    .await
    .unwrap();
  assert_eq!(first.len(), 2);

  let second = s
    .insert_chains(session.session_id, vec![
      "a.py".to_owned(),
      "c.py".to_owned(),
    ])
    .await
    .unwrap();
  let names: Vec<&str> =
    second.iter().map(|c| c.file_name.as_str()).collect();
  assert_eq!(names, ["c.py"]);

  let all = s.list_session_chains(session.session_id).await.unwrap();
  assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn delete_session_chains_removes_all() {
  let s = store().await;
  let session = s.insert_session(new_session("wipe")).await.unwrap();
  s.insert_chains(session.session_id, vec![
    "a.py".to_owned(),
    "b.py".to_owned(),
  ])
  .await
  .unwrap();

  assert_eq!(s.delete_session_chains(session.session_id).await.unwrap(), 2);
  assert!(s.list_session_chains(session.session_id).await.unwrap().is_empty());
}

// ─── Questions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_questions_bulk_and_list() {
  let s = store().await;
  let session = s.insert_session(new_session("bulk")).await.unwrap();

  let created = s
    .insert_questions(session.session_id, vec![
      new_question("one"),
      new_question("two"),
      new_question("three"),
    ])
    .await
    .unwrap();
  assert_eq!(created.len(), 3);

  let listed = s.list_session_questions(session.session_id).await.unwrap();
  assert_eq!(listed.len(), 3);
}

#[tokio::test]
async fn insert_questions_rolls_back_on_failure() {
  let s = store().await;

  // Unknown session id violates the foreign key; the whole batch must fail.
  let result = s
    .insert_questions(Uuid::new_v4(), vec![
      new_question("one"),
      new_question("two"),
    ])
    .await;
  assert!(result.is_err());
}

#[tokio::test]
async fn delete_questions_removes_only_named_ids() {
  let s = store().await;
  let session = s.insert_session(new_session("subset")).await.unwrap();
  let created = s
    .insert_questions(session.session_id, vec![
      new_question("keep"),
      new_question("drop"),
    ])
    .await
    .unwrap();

  let removed = s
    .delete_questions(vec![created[1].question_id, Uuid::new_v4()])
    .await
    .unwrap();
  assert_eq!(removed, 1);

  let remaining = s.list_session_questions(session.session_id).await.unwrap();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].question_text, "keep");
}

// ─── Answers ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_answers_bulk_is_all_or_nothing() {
  let s = store().await;
  let (_, chain_id, configuration_id, question_id) = seed_hierarchy(&s).await;

  let result = s
    .insert_answers(vec![
      (question_id, NewAnswer {
        chain_id,
        configuration_id,
        generated_answer: "fine".to_owned(),
        score: None,
      }),
      (question_id, NewAnswer {
        // Unknown chain violates the foreign key.
        chain_id: Uuid::new_v4(),
        configuration_id,
        generated_answer: "doomed".to_owned(),
        score: None,
      }),
    ])
    .await;
  assert!(result.is_err());

  let listed = s.list_question_answers(question_id).await.unwrap();
  assert!(listed.is_empty());
}

#[tokio::test]
async fn update_answer_score_sets_and_clears() {
  let s = store().await;
  let (_, chain_id, configuration_id, question_id) = seed_hierarchy(&s).await;

  let answer = s
    .insert_answer(question_id, NewAnswer {
      chain_id,
      configuration_id,
      generated_answer: "generated".to_owned(),
      score: None,
    })
    .await
    .unwrap();

  let scored = s
    .update_answer_score(answer.answer_id, Some(Score::new(4).unwrap()))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(scored.score.map(Score::value), Some(4));

  let cleared = s
    .update_answer_score(answer.answer_id, None)
    .await
    .unwrap()
    .unwrap();
  assert!(cleared.score.is_none());
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comment_roundtrip_and_list() {
  let s = store().await;
  let (_, chain_id, configuration_id, question_id) = seed_hierarchy(&s).await;
  let answer = s
    .insert_answer(question_id, NewAnswer {
      chain_id,
      configuration_id,
      generated_answer: "generated".to_owned(),
      score: None,
    })
    .await
    .unwrap();

  let comment = s
    .insert_comment(answer.answer_id, NewComment {
      comment_text: "misses the citation".to_owned(),
    })
    .await
    .unwrap();

  let listed = s.list_answer_comments(answer.answer_id).await.unwrap();
  assert_eq!(listed, vec![comment]);
}
