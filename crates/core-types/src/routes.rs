use crate::enums::Tenant;
use crate::error::CoreError;
use std::fmt;
use std::str::FromStr;

/// The screens a tenant can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pagina {
    Painel,
    Vendas,
    Despesas,
    Estoque,
    Postes,
    Movimentos,
}

impl Pagina {
    pub const ALL: [Pagina; 6] = [
        Pagina::Painel,
        Pagina::Vendas,
        Pagina::Despesas,
        Pagina::Estoque,
        Pagina::Postes,
        Pagina::Movimentos,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Pagina::Painel => "dashboard",
            Pagina::Vendas => "vendas",
            Pagina::Despesas => "despesas",
            Pagina::Estoque => "estoque",
            Pagina::Postes => "postes",
            Pagina::Movimentos => "movimentos",
        }
    }

    fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.slug() == slug)
    }
}

/// A tenant-scoped route such as `/vermelho/vendas`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rota {
    pub tenant: Tenant,
    pub pagina: Pagina,
}

impl Rota {
    pub fn new(tenant: Tenant, pagina: Pagina) -> Self {
        Self { tenant, pagina }
    }

    /// The landing page of a tenant.
    pub fn painel(tenant: Tenant) -> Self {
        Self::new(tenant, Pagina::Painel)
    }
}

impl fmt::Display for Rota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.tenant, self.pagina.slug())
    }
}

impl FromStr for Rota {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalida = || CoreError::RotaInvalida(s.to_string());
        let mut partes = s.trim().trim_matches('/').split('/').filter(|p| !p.is_empty());

        let tenant = partes.next().ok_or_else(invalida)?.parse::<Tenant>().map_err(|_| invalida())?;
        let pagina = match partes.next() {
            None => Pagina::Painel,
            Some(slug) => Pagina::from_slug(&slug.to_lowercase()).ok_or_else(invalida)?,
        };
        if partes.next().is_some() {
            return Err(invalida());
        }

        Ok(Rota { tenant, pagina })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tenant_scoped_routes() {
        let rota: Rota = "/branco/estoque".parse().unwrap();
        assert_eq!(rota, Rota::new(Tenant::Branco, Pagina::Estoque));
        assert_eq!(rota.to_string(), "/branco/estoque");
    }

    #[test]
    fn bare_tenant_opens_the_dashboard() {
        let rota: Rota = "vermelho/".parse().unwrap();
        assert_eq!(rota, Rota::painel(Tenant::Vermelho));
    }

    #[test]
    fn rejects_unknown_segments() {
        assert!("/azul/vendas".parse::<Rota>().is_err());
        assert!("/branco/relatorios".parse::<Rota>().is_err());
        assert!("/branco/vendas/1".parse::<Rota>().is_err());
        assert!("".parse::<Rota>().is_err());
    }
}
