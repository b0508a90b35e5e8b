use crate::store::Sessao;
use core_types::Rota;

/// Outcome of checking a route against the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acesso {
    Permitido,
    /// Logged in, but the route belongs to another tenant. Go to your own dashboard instead.
    Redirecionar(Rota),
    Login,
}

/// Each tenant only sees its own routes. `sessao` must already be validated for expiry.
pub fn guardar(sessao: Option<&Sessao>, rota: &Rota) -> Acesso {
    match sessao {
        Some(sessao) if sessao.autenticado => {
            if sessao.tenant == rota.tenant {
                Acesso::Permitido
            } else {
                tracing::warn!(
                    sessao = %sessao.tenant,
                    %rota,
                    "Route belongs to another tenant, redirecting."
                );
                Acesso::Redirecionar(Rota::painel(sessao.tenant))
            }
        }
        _ => Acesso::Login,
    }
}
