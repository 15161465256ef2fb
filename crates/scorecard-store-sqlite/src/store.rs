//! [`SqliteStore`] — the SQLite implementation of [`EvalStore`].

use std::{path::Path, time::Instant};

use chrono::Utc;
use uuid::Uuid;

use scorecard_core::{
  answer::{Answer, AnswerComment, CommentPatch, NewAnswer, NewComment, Score},
  chain::Chain,
  configuration::{Configuration, ConfigurationPatch, NewConfiguration},
  question::{NewQuestion, Question, QuestionPatch},
  session::{NewSession, Session, SessionPatch},
  store::{EvalStore, ListQuery},
};

use crate::{
  Error, Result,
  encode::{
    RawAnswer, RawChain, RawComment, RawConfiguration, RawQuestion, RawSession,
    encode_dt, encode_json, encode_uuid,
  },
  repo,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Scorecard store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── EvalStore impl ──────────────────────────────────────────────────────────

impl EvalStore for SqliteStore {
  type Error = Error;

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn insert_session(&self, new: NewSession) -> Result<Session> {
    let now = Utc::now();
    let session = Session {
      session_id:    Uuid::new_v4(),
      created_at:    now,
      name:          new.name,
      description:   new.description,
      last_modified: now,
    };
    let raw = RawSession::from_session(&session);

    let started = Instant::now();
    self
      .conn
      .call(move |conn| Ok(repo::insert_row(conn, &raw)?))
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "created session");

    Ok(session)
  }

  async fn get_session(&self, id: Uuid) -> Result<Option<Session>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| Ok(repo::fetch_row(conn, &id_str)?))
      .await?;
    raw.map(RawSession::into_session).transpose()
  }

  async fn list_sessions(&self, query: ListQuery) -> Result<Vec<Session>> {
    let raws: Vec<RawSession> = self
      .conn
      .call(move |conn| Ok(repo::fetch_page(conn, &query)?))
      .await?;
    raws.into_iter().map(RawSession::into_session).collect()
  }

  async fn update_session(
    &self,
    id: Uuid,
    patch: SessionPatch,
  ) -> Result<Option<Session>> {
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let started = Instant::now();
    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut raw) = repo::fetch_row::<RawSession>(&tx, &id_str)? else {
          return Ok(None);
        };
        if let Some(name) = patch.name {
          raw.name = name;
        }
        if let Some(description) = patch.description {
          raw.description = Some(description);
        }
        raw.last_modified = now_str;
        tx.execute(
          "UPDATE sessions SET name = ?2, description = ?3, last_modified = ?4
           WHERE session_id = ?1",
          rusqlite::params![
            raw.session_id,
            raw.name,
            raw.description,
            raw.last_modified,
          ],
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "updated session");

    raw.map(RawSession::into_session).transpose()
  }

  async fn delete_session(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let started = Instant::now();
    let removed = self
      .conn
      .call(move |conn| Ok(repo::delete_row::<RawSession>(conn, &id_str)?))
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "deleted session");

    Ok(removed)
  }

  // ── Chains ────────────────────────────────────────────────────────────────

  async fn insert_chains(
    &self,
    session_id: Uuid,
    file_names: Vec<String>,
  ) -> Result<Vec<Chain>> {
    let now = Utc::now();
    let chains: Vec<Chain> = file_names
      .into_iter()
      .map(|file_name| Chain {
        chain_id: Uuid::new_v4(),
        created_at: now,
        session_id,
        file_name,
      })
      .collect();
    let raws: Vec<RawChain> = chains.iter().map(RawChain::from_chain).collect();

    let started = Instant::now();
    let inserted: Vec<bool> = self
      .conn
      .call(move |conn| Ok(repo::insert_rows_skip_conflicts(conn, &raws)?))
      .await?;
    tracing::debug!(
      count = inserted.iter().filter(|landed| **landed).count(),
      elapsed = ?started.elapsed(),
      "created chains",
    );

    Ok(
      chains
        .into_iter()
        .zip(inserted)
        .filter_map(|(chain, landed)| landed.then_some(chain))
        .collect(),
    )
  }

  async fn get_chain(&self, id: Uuid) -> Result<Option<Chain>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawChain> = self
      .conn
      .call(move |conn| Ok(repo::fetch_row(conn, &id_str)?))
      .await?;
    raw.map(RawChain::into_chain).transpose()
  }

  async fn list_session_chains(&self, session_id: Uuid) -> Result<Vec<Chain>> {
    let key = encode_uuid(session_id);
    let raws: Vec<RawChain> = self
      .conn
      .call(move |conn| Ok(repo::fetch_by_column(conn, "session_id", &key)?))
      .await?;
    raws.into_iter().map(RawChain::into_chain).collect()
  }

  async fn delete_chain(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let started = Instant::now();
    let removed = self
      .conn
      .call(move |conn| Ok(repo::delete_row::<RawChain>(conn, &id_str)?))
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "deleted chain");

    Ok(removed)
  }

  async fn delete_session_chains(&self, session_id: Uuid) -> Result<usize> {
    let key = encode_uuid(session_id);

    let started = Instant::now();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(repo::delete_by_column::<RawChain>(conn, "session_id", &key)?)
      })
      .await?;
    tracing::debug!(count = removed, elapsed = ?started.elapsed(), "deleted session chains");

    Ok(removed)
  }

  // ── Questions ─────────────────────────────────────────────────────────────

  async fn insert_question(
    &self,
    session_id: Uuid,
    new: NewQuestion,
  ) -> Result<Question> {
    let now = Utc::now();
    let question = Question {
      question_id:     Uuid::new_v4(),
      created_at:      now,
      session_id,
      question_text:   new.question_text,
      expected_answer: new.expected_answer,
      last_modified:   now,
    };
    let raw = RawQuestion::from_question(&question);

    let started = Instant::now();
    self
      .conn
      .call(move |conn| Ok(repo::insert_row(conn, &raw)?))
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "created question");

    Ok(question)
  }

  async fn insert_questions(
    &self,
    session_id: Uuid,
    new: Vec<NewQuestion>,
  ) -> Result<Vec<Question>> {
    let now = Utc::now();
    let questions: Vec<Question> = new
      .into_iter()
      .map(|q| Question {
        question_id:     Uuid::new_v4(),
        created_at:      now,
        session_id,
        question_text:   q.question_text,
        expected_answer: q.expected_answer,
        last_modified:   now,
      })
      .collect();
    let raws: Vec<RawQuestion> =
      questions.iter().map(RawQuestion::from_question).collect();

    let started = Instant::now();
    self
      .conn
      .call(move |conn| Ok(repo::insert_rows(conn, &raws)?))
      .await?;
    tracing::debug!(
      count = questions.len(),
      elapsed = ?started.elapsed(),
      "created questions",
    );

    Ok(questions)
  }

  async fn get_question(&self, id: Uuid) -> Result<Option<Question>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawQuestion> = self
      .conn
      .call(move |conn| Ok(repo::fetch_row(conn, &id_str)?))
      .await?;
    raw.map(RawQuestion::into_question).transpose()
  }

  async fn list_session_questions(&self, session_id: Uuid) -> Result<Vec<Question>> {
    let key = encode_uuid(session_id);
    let raws: Vec<RawQuestion> = self
      .conn
      .call(move |conn| Ok(repo::fetch_by_column(conn, "session_id", &key)?))
      .await?;
    raws.into_iter().map(RawQuestion::into_question).collect()
  }

  async fn update_question(
    &self,
    id: Uuid,
    patch: QuestionPatch,
  ) -> Result<Option<Question>> {
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let started = Instant::now();
    let raw: Option<RawQuestion> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut raw) = repo::fetch_row::<RawQuestion>(&tx, &id_str)? else {
          return Ok(None);
        };
        if let Some(question_text) = patch.question_text {
          raw.question_text = question_text;
        }
        if let Some(expected_answer) = patch.expected_answer {
          raw.expected_answer = Some(expected_answer);
        }
        raw.last_modified = now_str;
        tx.execute(
          "UPDATE questions
           SET question_text = ?2, expected_answer = ?3, last_modified = ?4
           WHERE question_id = ?1",
          rusqlite::params![
            raw.question_id,
            raw.question_text,
            raw.expected_answer,
            raw.last_modified,
          ],
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "updated question");

    raw.map(RawQuestion::into_question).transpose()
  }

  async fn delete_question(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let started = Instant::now();
    let removed = self
      .conn
      .call(move |conn| Ok(repo::delete_row::<RawQuestion>(conn, &id_str)?))
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "deleted question");

    Ok(removed)
  }

  async fn delete_questions(&self, ids: Vec<Uuid>) -> Result<usize> {
    let id_strs: Vec<String> = ids.into_iter().map(encode_uuid).collect();

    let started = Instant::now();
    let removed = self
      .conn
      .call(move |conn| Ok(repo::delete_rows::<RawQuestion>(conn, &id_strs)?))
      .await?;
    tracing::debug!(count = removed, elapsed = ?started.elapsed(), "deleted questions");

    Ok(removed)
  }

  // ── Configurations ────────────────────────────────────────────────────────

  async fn insert_configuration(
    &self,
    session_id: Uuid,
    chain_id: Uuid,
    new: NewConfiguration,
  ) -> Result<Configuration> {
    let configuration = Configuration {
      configuration_id: Uuid::new_v4(),
      created_at:       Utc::now(),
      session_id,
      chain_id,
      config_schema:    new.config_schema,
      config_values:    new.config_values,
    };
    let raw = RawConfiguration::from_configuration(&configuration)?;

    let started = Instant::now();
    self
      .conn
      .call(move |conn| Ok(repo::insert_row(conn, &raw)?))
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "created configuration");

    Ok(configuration)
  }

  async fn get_configuration(&self, id: Uuid) -> Result<Option<Configuration>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawConfiguration> = self
      .conn
      .call(move |conn| Ok(repo::fetch_row(conn, &id_str)?))
      .await?;
    raw.map(RawConfiguration::into_configuration).transpose()
  }

  async fn list_session_configurations(
    &self,
    session_id: Uuid,
  ) -> Result<Vec<Configuration>> {
    let key = encode_uuid(session_id);
    let raws: Vec<RawConfiguration> = self
      .conn
      .call(move |conn| Ok(repo::fetch_by_column(conn, "session_id", &key)?))
      .await?;
    raws
      .into_iter()
      .map(RawConfiguration::into_configuration)
      .collect()
  }

  async fn list_chain_configurations(
    &self,
    chain_id: Uuid,
  ) -> Result<Vec<Configuration>> {
    let key = encode_uuid(chain_id);
    let raws: Vec<RawConfiguration> = self
      .conn
      .call(move |conn| Ok(repo::fetch_by_column(conn, "chain_id", &key)?))
      .await?;
    raws
      .into_iter()
      .map(RawConfiguration::into_configuration)
      .collect()
  }

  async fn update_configuration(
    &self,
    id: Uuid,
    patch: ConfigurationPatch,
  ) -> Result<Option<Configuration>> {
    let id_str = encode_uuid(id);
    let schema_str = patch.config_schema.as_ref().map(encode_json).transpose()?;
    let values_str = patch.config_values.as_ref().map(encode_json).transpose()?;

    let started = Instant::now();
    let raw: Option<RawConfiguration> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut raw) = repo::fetch_row::<RawConfiguration>(&tx, &id_str)?
        else {
          return Ok(None);
        };
        if let Some(schema) = schema_str {
          raw.config_schema = Some(schema);
        }
        if let Some(values) = values_str {
          raw.config_values = Some(values);
        }
        tx.execute(
          "UPDATE configurations SET config_schema = ?2, config_values = ?3
           WHERE configuration_id = ?1",
          rusqlite::params![
            raw.configuration_id,
            raw.config_schema,
            raw.config_values,
          ],
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "updated configuration");

    raw.map(RawConfiguration::into_configuration).transpose()
  }

  async fn delete_configuration(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let started = Instant::now();
    let removed = self
      .conn
      .call(move |conn| Ok(repo::delete_row::<RawConfiguration>(conn, &id_str)?))
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "deleted configuration");

    Ok(removed)
  }

  // ── Answers ───────────────────────────────────────────────────────────────

  async fn insert_answer(
    &self,
    question_id: Uuid,
    new: NewAnswer,
  ) -> Result<Answer> {
    let answer = Answer {
      answer_id:        Uuid::new_v4(),
      created_at:       Utc::now(),
      chain_id:         new.chain_id,
      question_id,
      configuration_id: new.configuration_id,
      generated_answer: new.generated_answer,
      score:            new.score,
    };
    let raw = RawAnswer::from_answer(&answer);

    let started = Instant::now();
    self
      .conn
      .call(move |conn| Ok(repo::insert_row(conn, &raw)?))
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "created answer");

    Ok(answer)
  }

  async fn insert_answers(
    &self,
    rows: Vec<(Uuid, NewAnswer)>,
  ) -> Result<Vec<Answer>> {
    let now = Utc::now();
    let answers: Vec<Answer> = rows
      .into_iter()
      .map(|(question_id, a)| Answer {
        answer_id:        Uuid::new_v4(),
        created_at:       now,
        chain_id:         a.chain_id,
        question_id,
        configuration_id: a.configuration_id,
        generated_answer: a.generated_answer,
        score:            a.score,
      })
      .collect();
    let raws: Vec<RawAnswer> = answers.iter().map(RawAnswer::from_answer).collect();

    let started = Instant::now();
    self
      .conn
      .call(move |conn| Ok(repo::insert_rows(conn, &raws)?))
      .await?;
    tracing::debug!(
      count = answers.len(),
      elapsed = ?started.elapsed(),
      "created answers",
    );

    Ok(answers)
  }

  async fn get_answer(&self, id: Uuid) -> Result<Option<Answer>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawAnswer> = self
      .conn
      .call(move |conn| Ok(repo::fetch_row(conn, &id_str)?))
      .await?;
    raw.map(RawAnswer::into_answer).transpose()
  }

  async fn list_question_answers(&self, question_id: Uuid) -> Result<Vec<Answer>> {
    let key = encode_uuid(question_id);
    let raws: Vec<RawAnswer> = self
      .conn
      .call(move |conn| Ok(repo::fetch_by_column(conn, "question_id", &key)?))
      .await?;
    raws.into_iter().map(RawAnswer::into_answer).collect()
  }

  async fn list_configuration_answers(
    &self,
    configuration_id: Uuid,
  ) -> Result<Vec<Answer>> {
    let key = encode_uuid(configuration_id);
    let raws: Vec<RawAnswer> = self
      .conn
      .call(move |conn| Ok(repo::fetch_by_column(conn, "configuration_id", &key)?))
      .await?;
    raws.into_iter().map(RawAnswer::into_answer).collect()
  }

  async fn update_answer_score(
    &self,
    id: Uuid,
    score: Option<Score>,
  ) -> Result<Option<Answer>> {
    let id_str = encode_uuid(id);
    let score_val = score.map(|s| i64::from(s.value()));

    let started = Instant::now();
    let raw: Option<RawAnswer> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut raw) = repo::fetch_row::<RawAnswer>(&tx, &id_str)? else {
          return Ok(None);
        };
        raw.score = score_val;
        tx.execute(
          "UPDATE answers SET score = ?2 WHERE answer_id = ?1",
          rusqlite::params![raw.answer_id, raw.score],
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "updated answer score");

    raw.map(RawAnswer::into_answer).transpose()
  }

  async fn delete_answer(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let started = Instant::now();
    let removed = self
      .conn
      .call(move |conn| Ok(repo::delete_row::<RawAnswer>(conn, &id_str)?))
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "deleted answer");

    Ok(removed)
  }

  async fn delete_question_answers(&self, question_id: Uuid) -> Result<usize> {
    let key = encode_uuid(question_id);

    let started = Instant::now();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(repo::delete_by_column::<RawAnswer>(conn, "question_id", &key)?)
      })
      .await?;
    tracing::debug!(count = removed, elapsed = ?started.elapsed(), "deleted question answers");

    Ok(removed)
  }

  // ── Answer comments ───────────────────────────────────────────────────────

  async fn insert_comment(
    &self,
    answer_id: Uuid,
    new: NewComment,
  ) -> Result<AnswerComment> {
    let now = Utc::now();
    let comment = AnswerComment {
      comment_id:    Uuid::new_v4(),
      created_at:    now,
      answer_id,
      comment_text:  new.comment_text,
      last_modified: now,
    };
    let raw = RawComment::from_comment(&comment);

    let started = Instant::now();
    self
      .conn
      .call(move |conn| Ok(repo::insert_row(conn, &raw)?))
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "created comment");

    Ok(comment)
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<AnswerComment>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| Ok(repo::fetch_row(conn, &id_str)?))
      .await?;
    raw.map(RawComment::into_comment).transpose()
  }

  async fn list_answer_comments(&self, answer_id: Uuid) -> Result<Vec<AnswerComment>> {
    let key = encode_uuid(answer_id);
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| Ok(repo::fetch_by_column(conn, "answer_id", &key)?))
      .await?;
    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn update_comment(
    &self,
    id: Uuid,
    patch: CommentPatch,
  ) -> Result<Option<AnswerComment>> {
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let started = Instant::now();
    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut raw) = repo::fetch_row::<RawComment>(&tx, &id_str)? else {
          return Ok(None);
        };
        if let Some(comment_text) = patch.comment_text {
          raw.comment_text = comment_text;
        }
        raw.last_modified = now_str;
        tx.execute(
          "UPDATE answer_comments SET comment_text = ?2, last_modified = ?3
           WHERE comment_id = ?1",
          rusqlite::params![raw.comment_id, raw.comment_text, raw.last_modified],
        )?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "updated comment");

    raw.map(RawComment::into_comment).transpose()
  }

  async fn delete_comment(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let started = Instant::now();
    let removed = self
      .conn
      .call(move |conn| Ok(repo::delete_row::<RawComment>(conn, &id_str)?))
      .await?;
    tracing::debug!(elapsed = ?started.elapsed(), "deleted comment");

    Ok(removed)
  }
}
