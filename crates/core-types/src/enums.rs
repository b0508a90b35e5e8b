use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three business contexts. Every backend request is scoped by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tenant {
    Vermelho,
    Branco,
    Jefferson,
}

impl Tenant {
    /// The value sent in the tenant header and used in routes.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tenant::Vermelho => "vermelho",
            Tenant::Branco => "branco",
            Tenant::Jefferson => "jefferson",
        }
    }

    pub fn nome_exibicao(&self) -> &'static str {
        match self {
            Tenant::Vermelho => "Caminhão Vermelho",
            Tenant::Branco => "Caminhão Branco",
            Tenant::Jefferson => "Jefferson (gestão)",
        }
    }

    /// The trucks whose data this tenant sees. The manager view spans both.
    pub fn caminhoes(&self) -> &'static [Tenant] {
        match self {
            Tenant::Vermelho => &[Tenant::Vermelho],
            Tenant::Branco => &[Tenant::Branco],
            Tenant::Jefferson => &[Tenant::Vermelho, Tenant::Branco],
        }
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tenant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "vermelho" => Ok(Tenant::Vermelho),
            "branco" => Ok(Tenant::Branco),
            "jefferson" => Ok(Tenant::Jefferson),
            _ => Err(CoreError::TenantDesconhecido(s.to_string())),
        }
    }
}

/// Sale variant. The wire codes are single letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TipoVenda {
    #[serde(rename = "V")]
    Normal,
    #[serde(rename = "E")]
    Extra,
    #[serde(rename = "L")]
    Loja,
}

impl TipoVenda {
    pub fn codigo(&self) -> &'static str {
        match self {
            TipoVenda::Normal => "V",
            TipoVenda::Extra => "E",
            TipoVenda::Loja => "L",
        }
    }

    pub fn descricao(&self) -> &'static str {
        match self {
            TipoVenda::Normal => "Normal",
            TipoVenda::Extra => "Extra",
            TipoVenda::Loja => "Loja",
        }
    }
}

impl fmt::Display for TipoVenda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codigo())
    }
}

impl FromStr for TipoVenda {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "V" | "NORMAL" => Ok(TipoVenda::Normal),
            "E" | "EXTRA" => Ok(TipoVenda::Extra),
            "L" | "LOJA" => Ok(TipoVenda::Loja),
            other => Err(format!("unknown sale type '{other}' (expected V, E or L)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoDespesa {
    Funcionario,
    Outras,
}

impl fmt::Display for TipoDespesa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TipoDespesa::Funcionario => f.write_str("FUNCIONARIO"),
            TipoDespesa::Outras => f.write_str("OUTRAS"),
        }
    }
}

impl FromStr for TipoDespesa {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FUNCIONARIO" | "FUNCIONÁRIO" => Ok(TipoDespesa::Funcionario),
            "OUTRAS" => Ok(TipoDespesa::Outras),
            other => Err(format!("unknown expense type '{other}' (expected FUNCIONARIO or OUTRAS)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoMovimento {
    Entrada,
    Saida,
}

/// Stock health of one pole. A negative quantity means the truck oversold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SituacaoEstoque {
    Negativo,
    Zerado,
    Baixo,
    Normal,
}

impl SituacaoEstoque {
    pub fn classificar(quantidade: i64, limite_baixo: i64) -> Self {
        if quantidade < 0 {
            SituacaoEstoque::Negativo
        } else if quantidade == 0 {
            SituacaoEstoque::Zerado
        } else if quantidade <= limite_baixo {
            SituacaoEstoque::Baixo
        } else {
            SituacaoEstoque::Normal
        }
    }

    pub fn em_alerta(&self) -> bool {
        !matches!(self, SituacaoEstoque::Normal)
    }
}

impl fmt::Display for SituacaoEstoque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SituacaoEstoque::Negativo => "NEGATIVO",
            SituacaoEstoque::Zerado => "ZERADO",
            SituacaoEstoque::Baixo => "BAIXO",
            SituacaoEstoque::Normal => "OK",
        };
        f.write_str(s)
    }
}
