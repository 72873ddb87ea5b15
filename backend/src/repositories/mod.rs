//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Questo modulo organizza i repository in sotto-moduli separati per una migliore manutenibilità.
//! Ogni repository gestisce le operazioni di database per una specifica entità.

// ************************* NOTA SU SQLX ************************* //

/*
   Le query usano la variante a runtime (sqlx::query_as::<_, T>) con #[derive(FromRow)]
   sulle entità: in questo modo la compilazione non richiede un database raggiungibile.
   I placeholder di Postgres sono posizionali: $1, $2, ...
   Riepilogo dei metodi di fetch:
   .execute(..)          -> INSERT/UPDATE/DELETE senza RETURNING (rows_affected)
   .fetch_optional(..)   -> zero o una riga
   .fetch_one(..)        -> esattamente una riga (errore RowNotFound altrimenti), anche per COUNT(*)
   .fetch_all(..)        -> Vec di righe
   Gli INSERT/UPDATE usano RETURNING per restituire l'entità senza una seconda lettura.
*/

// ************************* MODULI REPOSITORY ************************* //

pub mod item;
pub mod traits;
pub mod user;

// alias di tipo per il pool, per semplificare lo switch in caso in cui vogliamo usare un altro db
pub type PoolType = sqlx::PgPool;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Read, Update};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use item::ItemRepository;
pub use user::UserRepository;
