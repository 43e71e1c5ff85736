//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `migrations/` exactly;
//! they drive Diesel's compile-time query validation. Regenerate with
//! `diesel print-schema` after a migration changes the schema.

diesel::table! {
    /// Marketplace participants, created by the seed bootstrap only.
    users (id) {
        id -> Uuid,
        #[max_length = 64]
        username -> Varchar,
        #[max_length = 16]
        role -> Varchar,
        organization_name -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Plantation claims awaiting or having received verification.
    plantations (id) {
        id -> Uuid,
        ngo_id -> Uuid,
        mangrove_count -> Int4,
        latitude -> Numeric,
        longitude -> Numeric,
        notes -> Nullable<Text>,
        image_url -> Nullable<Text>,
        credits_earned -> Int4,
        #[max_length = 16]
        status -> Varchar,
        created_at -> Timestamptz,
        verified_at -> Nullable<Timestamptz>,
        verified_by -> Nullable<Uuid>,
    }
}

diesel::table! {
    /// Credit blocks minted by plantation verification.
    credits (id) {
        id -> Uuid,
        plantation_id -> Uuid,
        ngo_id -> Uuid,
        current_owner_id -> Uuid,
        amount -> Int4,
        price_per_credit -> Numeric,
        #[max_length = 16]
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only ledger of mint and transfer events.
    ledger_entries (id) {
        id -> Uuid,
        #[max_length = 32]
        transaction_hash -> Varchar,
        #[max_length = 16]
        kind -> Varchar,
        from_user_id -> Nullable<Uuid>,
        to_user_id -> Uuid,
        credit_id -> Nullable<Uuid>,
        amount -> Int4,
        #[max_length = 16]
        status -> Varchar,
        created_at -> Timestamptz,
    }
}
