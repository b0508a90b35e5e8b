use crate::error::SessionError;
use api_client::AuthService;
use chrono::{DateTime, TimeDelta, Utc};
use configuration::SessionConfig;
use core_types::Tenant;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The logged-in identity, persisted between invocations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sessao {
    pub autenticado: bool,
    pub tenant: Tenant,
    pub nome_exibicao: String,
    pub login_em: DateTime<Utc>,
}

impl Sessao {
    pub fn nova(tenant: Tenant, nome_exibicao: impl Into<String>, agora: DateTime<Utc>) -> Self {
        Self {
            autenticado: true,
            tenant,
            nome_exibicao: nome_exibicao.into(),
            login_em: agora,
        }
    }

    pub fn expira_em(&self, duracao_maxima: Duration) -> DateTime<Utc> {
        let duracao = TimeDelta::from_std(duracao_maxima).unwrap_or(TimeDelta::MAX);
        self.login_em
            .checked_add_signed(duracao)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn valida_em(&self, agora: DateTime<Utc>, duracao_maxima: Duration) -> bool {
        self.autenticado && agora < self.expira_em(duracao_maxima)
    }
}

/// File-backed session storage.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    duracao_maxima: Duration,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>, duracao_maxima: Duration) -> Self {
        Self {
            path: path.into(),
            duracao_maxima,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.file.clone(), config.max_age)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn duracao_maxima(&self) -> Duration {
        self.duracao_maxima
    }

    pub fn salvar(&self, sessao: &Sessao) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(sessao)?)?;
        tracing::debug!(path = %self.path.display(), tenant = %sessao.tenant, "Session saved.");
        Ok(())
    }

    /// The stored session, if any. An unreadable file is discarded and treated as logged out.
    pub fn carregar(&self) -> Result<Option<Sessao>, SessionError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(sessao) => Ok(Some(sessao)),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding corrupt session file.");
                self.encerrar()?;
                Ok(None)
            }
        }
    }

    /// The stored session if it is still valid at `agora`.
    ///
    /// An expired session is removed from disk, so the next call reports
    /// [`SessionError::NaoAutenticado`].
    pub fn carregar_valida(&self, agora: DateTime<Utc>) -> Result<Sessao, SessionError> {
        let sessao = self.carregar()?.ok_or(SessionError::NaoAutenticado)?;
        if !sessao.autenticado {
            return Err(SessionError::NaoAutenticado);
        }
        if !sessao.valida_em(agora, self.duracao_maxima) {
            tracing::info!(tenant = %sessao.tenant, login_em = %sessao.login_em, "Session expired, logging out.");
            self.encerrar()?;
            return Err(SessionError::Expirada {
                login_em: sessao.login_em,
            });
        }
        Ok(sessao)
    }

    /// Removes the session file. Returns whether there was one.
    pub fn encerrar(&self) -> Result<bool, SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticates against the backend and persists the new session.
    pub async fn login(
        &self,
        auth: &AuthService,
        tenant: Tenant,
        senha: &str,
    ) -> Result<Sessao, SessionError> {
        let resposta = auth.login(tenant, senha).await?;
        let sessao = Sessao::nova(resposta.tenant_id, resposta.display_name, Utc::now());
        self.salvar(&sessao)?;
        Ok(sessao)
    }
}
