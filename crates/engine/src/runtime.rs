//! Thin runtime over Redis for atomic server-side scripts.
//!
//! Scripts are `SCRIPT LOAD`ed once at startup and invoked by SHA. A
//! `NOSCRIPT` reply (script cache flushed, failover to a fresh replica)
//! re-loads the text and retries exactly once; nothing else is retried here,
//! since blind retries would void the atomicity the scripts exist for.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use redis::aio::ConnectionManager;
use redis::{Client, ErrorKind};
use serde::de::DeserializeOwned;

use crate::error::EngineError;
use crate::scripts::ScriptDef;

#[derive(Clone)]
pub struct ScriptRuntime {
    conn: ConnectionManager,
    shas: Arc<RwLock<HashMap<&'static str, String>>>,
}

impl ScriptRuntime {
    /// Connect and pre-load every script in `scripts`.
    pub async fn connect(redis_url: &str, scripts: &[ScriptDef]) -> Result<Self, EngineError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        let runtime = Self {
            conn,
            shas: Arc::new(RwLock::new(HashMap::new())),
        };

        for script in scripts {
            let sha = runtime.script_load(script).await?;
            tracing::debug!(script = script.name, %sha, "loaded engine script");
        }

        Ok(runtime)
    }

    /// `SCRIPT LOAD` the text and cache its SHA under the script's name.
    pub async fn script_load(&self, script: &ScriptDef) -> Result<String, EngineError> {
        let mut conn = self.conn.clone();
        let sha: String = redis::cmd("SCRIPT")
            .arg("LOAD")
            .arg(script.text)
            .query_async(&mut conn)
            .await?;

        self.shas
            .write()
            .expect("script sha cache poisoned")
            .insert(script.name, sha.clone());

        Ok(sha)
    }

    /// Invoke a script by cached SHA and decode its JSON reply.
    pub async fn eval_json<T: DeserializeOwned>(
        &self,
        script: &ScriptDef,
        keys: &[String],
        argv: &[String],
    ) -> Result<T, EngineError> {
        let raw = self.eval_raw(script, keys, argv).await?;
        serde_json::from_str(&raw).map_err(|source| EngineError::MalformedReply {
            script: script.name,
            source,
        })
    }

    async fn eval_raw(
        &self,
        script: &ScriptDef,
        keys: &[String],
        argv: &[String],
    ) -> Result<String, EngineError> {
        let sha = self.cached_sha(script.name);
        let sha = match sha {
            Some(sha) => sha,
            None => self.script_load(script).await?,
        };

        match self.evalsha(&sha, keys, argv).await {
            Ok(raw) => Ok(raw),
            Err(err) if err.kind() == ErrorKind::NoScriptError => {
                tracing::warn!(script = script.name, "NOSCRIPT reply, re-loading script");
                let sha = self.script_load(script).await?;
                Ok(self.evalsha(&sha, keys, argv).await?)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn evalsha(
        &self,
        sha: &str,
        keys: &[String],
        argv: &[String],
    ) -> Result<String, redis::RedisError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("EVALSHA");
        cmd.arg(sha).arg(keys.len());
        for key in keys {
            cmd.arg(key);
        }
        for arg in argv {
            cmd.arg(arg);
        }
        cmd.query_async(&mut conn).await
    }

    fn cached_sha(&self, name: &str) -> Option<String> {
        self.shas
            .read()
            .expect("script sha cache poisoned")
            .get(name)
            .cloned()
    }

    /// A dedicated connection handle for non-script primitives (pipelines,
    /// EXISTS probes). Cloning a `ConnectionManager` is cheap.
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }
}
