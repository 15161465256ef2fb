//! Service-level tests against an in-memory SQLite store and an in-memory
//! chain host.

use std::sync::Arc;

use scorecard_core::{
  answer::{NewAnswer, NewComment, Score, ScoreUpdate},
  question::NewQuestion,
  session::NewSession,
};
use scorecard_store_sqlite::SqliteStore;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::{
  AnswerError, AnswerService, ChainError, ChainService, ConfigurationError,
  ConfigurationService, QuestionError, QuestionService, SessionService,
  host::{ChainHost, HostError},
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

/// In-memory chain host: a fixed file listing, echo-style invocation, and a
/// static schema document.
#[derive(Default)]
struct FakeHost {
  chains:      Vec<String>,
  /// Forced invocation outputs; `None` echoes the inputs one-to-one.
  outputs:     Option<Vec<String>>,
  fail_schema: bool,
}

impl ChainHost for FakeHost {
  async fn available_chains(&self) -> Result<Vec<String>, HostError> {
    Ok(self.chains.clone())
  }

  async fn batch_invoke(
    &self,
    _file_name: &str,
    inputs: Vec<String>,
    _configurable: Map<String, Value>,
  ) -> Result<Vec<String>, HostError> {
    match &self.outputs {
      Some(outputs) => Ok(outputs.clone()),
      None => Ok(inputs.iter().map(|i| format!("answer to: {i}")).collect()),
    }
  }

  async fn config_schema(&self, file_name: &str) -> Result<Value, HostError> {
    if self.fail_schema {
      return Err(HostError::Status(503));
    }
    Ok(json!({ "chain": file_name, "properties": {} }))
  }
}

struct Fixture {
  store: Arc<SqliteStore>,
  host:  Arc<FakeHost>,
}

impl Fixture {
  async fn new(host: FakeHost) -> Self {
    let store = SqliteStore::open_in_memory().await.expect("in-memory store");
    Self { store: Arc::new(store), host: Arc::new(host) }
  }

  async fn with_chains(chains: &[&str]) -> Self {
    Self::new(FakeHost {
      chains: chains.iter().map(|c| (*c).to_owned()).collect(),
      ..Default::default()
    })
    .await
  }

  fn sessions(&self) -> SessionService<SqliteStore> {
    SessionService::new(self.store.clone())
  }

  fn chains(&self) -> ChainService<SqliteStore, FakeHost> {
    ChainService::new(self.store.clone(), self.host.clone())
  }

  fn configurations(&self) -> ConfigurationService<SqliteStore, FakeHost> {
    ConfigurationService::new(self.store.clone(), self.host.clone())
  }

  fn questions(&self) -> QuestionService<SqliteStore> {
    QuestionService::new(self.store.clone())
  }

  fn answers(&self) -> AnswerService<SqliteStore> {
    AnswerService::new(self.store.clone())
  }
}

fn new_session(name: &str) -> NewSession {
  NewSession { name: name.to_owned(), description: None }
}

fn new_question(text: &str) -> NewQuestion {
  NewQuestion {
    question_text:   text.to_owned(),
    expected_answer: None,
  }
}

struct Seeded {
  session_id:       Uuid,
  chain_id:         Uuid,
  configuration_id: Uuid,
}

/// Session with one selected chain and one configuration.
async fn seed(fx: &Fixture) -> Seeded {
  let session = fx
    .sessions()
    .create_session(new_session("seeded"))
    .await
    .unwrap();
  let chains = fx
    .chains()
    .select_chains(session.session_id, vec!["rag_chain.py".to_owned()])
    .await
    .unwrap();
  let configuration = fx
    .configurations()
    .create_configuration(
      session.session_id,
      chains[0].chain_id,
      Default::default(),
    )
    .await
    .unwrap();
  Seeded {
    session_id:       session.session_id,
    chain_id:         chains[0].chain_id,
    configuration_id: configuration.configuration_id,
  }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_create_then_get_roundtrip() {
  let fx = Fixture::with_chains(&[]).await;
  let sessions = fx.sessions();

  let created = sessions.create_session(new_session("baseline")).await.unwrap();
  let fetched = sessions.get_session_by_id(created.session_id).await.unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn session_get_unknown_is_not_found() {
  let fx = Fixture::with_chains(&[]).await;
  let err = fx
    .sessions()
    .get_session_by_id(Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::SessionError::NotFound(_)));
}

// ─── Chain selection ─────────────────────────────────────────────────────────

#[tokio::test]
async fn select_chains_dedups_within_and_across_calls() {
  let fx = Fixture::with_chains(&["a.py", "b.py"]).await;
  let session = fx
    .sessions()
    .create_session(new_session("dedup"))
    .await
    .unwrap();
  let chains = fx.chains();

  let selection = vec![
    "a.py".to_owned(),
    "a.py".to_owned(),
    "b.py".to_owned(),
  ];

  // First call: the repeated "a.py" collapses, both files are created.
  let first = chains
    .select_chains(session.session_id, selection.clone())
    .await
    .unwrap();
  let mut names: Vec<&str> = first.iter().map(|c| c.file_name.as_str()).collect();
  names.sort();
  assert_eq!(names, ["a.py", "b.py"]);

  // Second identical call: everything is a duplicate — success, zero chains.
  let second = chains
    .select_chains(session.session_id, selection)
    .await
    .unwrap();
  assert!(second.is_empty());

  let attached = chains.get_session_chains(session.session_id).await.unwrap();
  assert_eq!(attached.len(), 2);
}

#[tokio::test]
async fn select_chains_rejects_unknown_files() {
  let fx = Fixture::with_chains(&["a.py"]).await;
  let session = fx
    .sessions()
    .create_session(new_session("unknown"))
    .await
    .unwrap();

  let err = fx
    .chains()
    .select_chains(session.session_id, vec![
      "a.py".to_owned(),
      "missing.py".to_owned(),
    ])
    .await
    .unwrap_err();
  match err {
    ChainError::UnknownFiles(files) => assert_eq!(files, ["missing.py"]),
    other => panic!("expected UnknownFiles, got {other:?}"),
  }
}

#[tokio::test]
async fn select_chains_requires_session() {
  let fx = Fixture::with_chains(&["a.py"]).await;
  let err = fx
    .chains()
    .select_chains(Uuid::new_v4(), vec!["a.py".to_owned()])
    .await
    .unwrap_err();
  assert!(matches!(err, ChainError::SessionNotFound(_)));
}

#[tokio::test]
async fn delete_chain_from_wrong_session_is_not_found() {
  let fx = Fixture::with_chains(&["a.py", "rag_chain.py"]).await;
  let seeded = seed(&fx).await;
  let other = fx
    .sessions()
    .create_session(new_session("other"))
    .await
    .unwrap();

  let err = fx
    .chains()
    .delete_session_chain(other.session_id, seeded.chain_id)
    .await
    .unwrap_err();
  assert!(matches!(err, ChainError::NotFound(_)));
}

// ─── Chain invocation ────────────────────────────────────────────────────────

#[tokio::test]
async fn invoke_chain_batch_answers_every_question() {
  let fx = Fixture::with_chains(&["rag_chain.py"]).await;
  let seeded = seed(&fx).await;
  fx.questions()
    .create_questions_bulk(seeded.session_id, vec![
      new_question("What is RAG?"),
      new_question("Why rerank?"),
    ])
    .await
    .unwrap();

  let answers = fx
    .chains()
    .invoke_chain_batch(
      seeded.session_id,
      seeded.chain_id,
      seeded.configuration_id,
    )
    .await
    .unwrap();
  assert_eq!(answers.len(), 2);

  // Outputs are zipped positionally onto the submitted questions.
  let questions = fx
    .questions()
    .get_session_questions(seeded.session_id)
    .await
    .unwrap();
  for answer in &answers {
    let question = questions
      .iter()
      .find(|q| q.question_id == answer.question_id)
      .expect("answer references a session question");
    assert_eq!(
      answer.generated_answer,
      format!("answer to: {}", question.question_text),
    );
    assert_eq!(answer.chain_id, seeded.chain_id);
    assert_eq!(answer.configuration_id, seeded.configuration_id);
    assert!(answer.score.is_none());
  }

  // And they were persisted.
  let persisted = fx
    .answers()
    .get_answers_by_configuration(seeded.configuration_id)
    .await
    .unwrap();
  assert_eq!(persisted.len(), 2);
}

#[tokio::test]
async fn invoke_chain_batch_without_questions_is_empty_success() {
  let fx = Fixture::with_chains(&["rag_chain.py"]).await;
  let seeded = seed(&fx).await;

  let answers = fx
    .chains()
    .invoke_chain_batch(
      seeded.session_id,
      seeded.chain_id,
      seeded.configuration_id,
    )
    .await
    .unwrap();
  assert!(answers.is_empty());
}

#[tokio::test]
async fn invoke_chain_batch_rejects_misaligned_output() {
  let fx = Fixture::new(FakeHost {
    chains:  vec!["rag_chain.py".to_owned()],
    outputs: Some(vec!["only one".to_owned()]),
    ..Default::default()
  })
  .await;
  let seeded = seed(&fx).await;
  fx.questions()
    .create_questions_bulk(seeded.session_id, vec![
      new_question("one"),
      new_question("two"),
    ])
    .await
    .unwrap();

  let err = fx
    .chains()
    .invoke_chain_batch(
      seeded.session_id,
      seeded.chain_id,
      seeded.configuration_id,
    )
    .await
    .unwrap_err();
  assert!(
    matches!(err, ChainError::OutputMismatch { expected: 2, got: 1 }),
    "got {err:?}",
  );

  // Nothing was persisted for the failed invocation.
  let persisted = fx
    .answers()
    .get_answers_by_configuration(seeded.configuration_id)
    .await
    .unwrap();
  assert!(persisted.is_empty());
}

#[tokio::test]
async fn invoke_chain_batch_requires_configuration_of_that_chain() {
  let fx = Fixture::with_chains(&["rag_chain.py", "other.py"]).await;
  let seeded = seed(&fx).await;
  fx.questions()
    .create_question(seeded.session_id, new_question("one"))
    .await
    .unwrap();

  // A configuration bound to a different chain must not be usable here.
  let other_chain = fx
    .chains()
    .select_chains(seeded.session_id, vec!["other.py".to_owned()])
    .await
    .unwrap();
  let foreign = fx
    .configurations()
    .create_configuration(
      seeded.session_id,
      other_chain[0].chain_id,
      Default::default(),
    )
    .await
    .unwrap();

  let err = fx
    .chains()
    .invoke_chain_batch(
      seeded.session_id,
      seeded.chain_id,
      foreign.configuration_id,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, ChainError::ConfigurationNotFound(_)));
}

// ─── Configurations ──────────────────────────────────────────────────────────

#[tokio::test]
async fn create_configuration_caches_host_schema() {
  let fx = Fixture::with_chains(&["rag_chain.py"]).await;
  let seeded = seed(&fx).await;

  let configuration = fx
    .configurations()
    .get_configuration_by_id(seeded.session_id, seeded.configuration_id)
    .await
    .unwrap();
  assert_eq!(
    configuration.config_schema,
    Some(json!({ "chain": "rag_chain.py", "properties": {} })),
  );
}

#[tokio::test]
async fn create_configuration_survives_schema_fetch_failure() {
  let fx = Fixture::new(FakeHost {
    chains:      vec!["rag_chain.py".to_owned()],
    fail_schema: true,
    ..Default::default()
  })
  .await;
  let seeded = seed(&fx).await;

  let configuration = fx
    .configurations()
    .get_configuration_by_id(seeded.session_id, seeded.configuration_id)
    .await
    .unwrap();
  assert!(configuration.config_schema.is_none());
}

#[tokio::test]
async fn get_chain_schema_distinguishes_not_found_from_host_failure() {
  let fx = Fixture::new(FakeHost {
    chains:      vec!["rag_chain.py".to_owned()],
    fail_schema: true,
    ..Default::default()
  })
  .await;
  let seeded = seed(&fx).await;
  let configurations = fx.configurations();

  // Unknown chain → a NotFound kind.
  let err = configurations
    .get_chain_schema(seeded.session_id, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, ConfigurationError::ChainNotFound(_)));

  // Existing chain but failing host → a downstream error, not a NotFound.
  let err = configurations
    .get_chain_schema(seeded.session_id, seeded.chain_id)
    .await
    .unwrap_err();
  assert!(matches!(err, ConfigurationError::Schema(_)));
}

// ─── Questions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_questions_bulk_skips_unresolvable_ids() {
  let fx = Fixture::with_chains(&[]).await;
  let session = fx
    .sessions()
    .create_session(new_session("bulk-delete"))
    .await
    .unwrap();
  let questions = fx.questions();

  let created = questions
    .create_question(session.session_id, new_question("kept?"))
    .await
    .unwrap();

  let deleted = questions
    .delete_questions_bulk(session.session_id, vec![
      created.question_id,
      Uuid::new_v4(),
    ])
    .await
    .unwrap();
  assert_eq!(deleted.len(), 1);
  assert_eq!(deleted[0].question_id, created.question_id);

  assert!(
    questions
      .get_session_questions(session.session_id)
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn delete_questions_bulk_skips_foreign_session_ids() {
  let fx = Fixture::with_chains(&[]).await;
  let mine = fx
    .sessions()
    .create_session(new_session("mine"))
    .await
    .unwrap();
  let theirs = fx
    .sessions()
    .create_session(new_session("theirs"))
    .await
    .unwrap();
  let questions = fx.questions();

  let foreign = questions
    .create_question(theirs.session_id, new_question("not yours"))
    .await
    .unwrap();

  let deleted = questions
    .delete_questions_bulk(mine.session_id, vec![foreign.question_id])
    .await
    .unwrap();
  assert!(deleted.is_empty());

  // The foreign question is untouched.
  let remaining = questions
    .get_session_questions(theirs.session_id)
    .await
    .unwrap();
  assert_eq!(remaining.len(), 1);
}

#[tokio::test]
async fn update_question_in_wrong_session_is_not_found() {
  let fx = Fixture::with_chains(&[]).await;
  let mine = fx
    .sessions()
    .create_session(new_session("mine"))
    .await
    .unwrap();
  let theirs = fx
    .sessions()
    .create_session(new_session("theirs"))
    .await
    .unwrap();
  let questions = fx.questions();

  let question = questions
    .create_question(theirs.session_id, new_question("original"))
    .await
    .unwrap();

  let err = questions
    .update_question(mine.session_id, question.question_id, Default::default())
    .await
    .unwrap_err();
  assert!(matches!(err, QuestionError::NotFound(_)));
}

// ─── Answers ─────────────────────────────────────────────────────────────────

async fn seed_question(fx: &Fixture, seeded: &Seeded, text: &str) -> Uuid {
  fx.questions()
    .create_question(seeded.session_id, new_question(text))
    .await
    .unwrap()
    .question_id
}

fn new_answer(seeded: &Seeded, text: &str) -> NewAnswer {
  NewAnswer {
    chain_id:         seeded.chain_id,
    configuration_id: seeded.configuration_id,
    generated_answer: text.to_owned(),
    score:            None,
  }
}

#[tokio::test]
async fn create_answers_bulk_is_all_or_nothing_on_bad_reference() {
  let fx = Fixture::with_chains(&["rag_chain.py"]).await;
  let seeded = seed(&fx).await;
  let question_id = seed_question(&fx, &seeded, "q").await;
  let answers = fx.answers();

  let err = answers
    .create_answers_bulk(question_id, vec![
      NewAnswer {
        // One bad chain reference fails the whole batch.
        chain_id: Uuid::new_v4(),
        ..new_answer(&seeded, "bad")
      },
      new_answer(&seeded, "good"),
    ])
    .await
    .unwrap_err();
  assert!(matches!(err, AnswerError::ChainNotFound(_)));

  let persisted = answers.get_answers_by_question(question_id).await.unwrap();
  assert!(persisted.is_empty());
}

#[tokio::test]
async fn average_score_is_zero_sentinel_without_scored_answers() {
  let fx = Fixture::with_chains(&["rag_chain.py"]).await;
  let seeded = seed(&fx).await;
  let question_id = seed_question(&fx, &seeded, "q").await;
  let answers = fx.answers();

  // An unscored answer exists, but nothing is scored yet.
  answers
    .create_answer(question_id, new_answer(&seeded, "unscored"))
    .await
    .unwrap();

  let average = answers
    .get_average_score_by_configuration(seeded.configuration_id)
    .await
    .unwrap();
  assert_eq!(average, 0.0);
}

#[tokio::test]
async fn average_score_is_mean_of_scored_answers() {
  let fx = Fixture::with_chains(&["rag_chain.py"]).await;
  let seeded = seed(&fx).await;
  let question_id = seed_question(&fx, &seeded, "q").await;
  let answers = fx.answers();

  let first = answers
    .create_answer(question_id, new_answer(&seeded, "scored 3"))
    .await
    .unwrap();
  let second = answers
    .create_answer(question_id, new_answer(&seeded, "scored 5"))
    .await
    .unwrap();
  answers
    .create_answer(question_id, new_answer(&seeded, "unscored"))
    .await
    .unwrap();

  answers
    .update_answer_score(question_id, first.answer_id, ScoreUpdate {
      score: Some(Score::new(3).unwrap()),
    })
    .await
    .unwrap();
  answers
    .update_answer_score(question_id, second.answer_id, ScoreUpdate {
      score: Some(Score::new(5).unwrap()),
    })
    .await
    .unwrap();

  let average = answers
    .get_average_score_by_configuration(seeded.configuration_id)
    .await
    .unwrap();
  assert_eq!(average, 4.0);
}

#[tokio::test]
async fn update_answer_score_for_foreign_question_is_not_found() {
  let fx = Fixture::with_chains(&["rag_chain.py"]).await;
  let seeded = seed(&fx).await;
  let owner = seed_question(&fx, &seeded, "owner").await;
  let other = seed_question(&fx, &seeded, "other").await;
  let answers = fx.answers();

  let answer = answers
    .create_answer(owner, new_answer(&seeded, "text"))
    .await
    .unwrap();

  let err = answers
    .update_answer_score(other, answer.answer_id, ScoreUpdate {
      score: Some(Score::new(1).unwrap()),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, AnswerError::NotFound(_)));

  // The score is untouched.
  let unchanged = answers.get_answers_by_question(owner).await.unwrap();
  assert!(unchanged[0].score.is_none());
}

#[tokio::test]
async fn create_answer_validates_every_reference() {
  let fx = Fixture::with_chains(&["rag_chain.py"]).await;
  let seeded = seed(&fx).await;
  let question_id = seed_question(&fx, &seeded, "q").await;
  let answers = fx.answers();

  let err = answers
    .create_answer(Uuid::new_v4(), new_answer(&seeded, "text"))
    .await
    .unwrap_err();
  assert!(matches!(err, AnswerError::QuestionNotFound(_)));

  let err = answers
    .create_answer(question_id, NewAnswer {
      configuration_id: Uuid::new_v4(),
      ..new_answer(&seeded, "text")
    })
    .await
    .unwrap_err();
  assert!(matches!(err, AnswerError::ConfigurationNotFound(_)));
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comment_belongs_to_check_guards_updates() {
  let fx = Fixture::with_chains(&["rag_chain.py"]).await;
  let seeded = seed(&fx).await;
  let question_id = seed_question(&fx, &seeded, "q").await;
  let answers = fx.answers();

  let first = answers
    .create_answer(question_id, new_answer(&seeded, "first"))
    .await
    .unwrap();
  let second = answers
    .create_answer(question_id, new_answer(&seeded, "second"))
    .await
    .unwrap();

  let comment = answers
    .create_answer_comment(first.answer_id, NewComment {
      comment_text: "hallucinated the source".to_owned(),
    })
    .await
    .unwrap();

  // Addressing the comment through the wrong answer is a NotFound.
  let err = answers
    .update_answer_comment(
      second.answer_id,
      comment.comment_id,
      Default::default(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, AnswerError::CommentNotFound(_)));

  let listed = answers.get_answer_comments(first.answer_id).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].comment_text, "hallucinated the source");
}
