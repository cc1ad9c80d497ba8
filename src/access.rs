// src/access.rs

//! Controle de acesso por linha.
//!
//! O catálogo de políticas é definido uma única vez aqui e aplicado em dois lugares:
//! - em processo, pelos serviços (`PolicySet::permits` e derivados);
//! - no Postgres, renderizado como `CREATE POLICY` e instalado na inicialização.
//!
//! Uma operação é permitida se pelo menos uma política da tabela/verbo aceitar
//! (OU entre políticas). Em escritas, a política precisa aceitar o USING na linha
//! existente E o WITH CHECK na linha nova.

pub mod catalog;
pub mod policy;
pub mod rule;
pub mod sql;
pub mod table;

pub use catalog::default_catalog;
pub use policy::{rls_violation, Policy, PolicySet, Verb, WriteDecision};
pub use rule::Rule;
pub use table::{GovernedRow, RowFacts, Table};
