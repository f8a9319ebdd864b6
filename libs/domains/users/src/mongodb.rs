//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::mongodb::is_duplicate_key;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::{FindOneAndUpdateOptions, FindOneOptions, FindOptions, IndexOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::filter;
use crate::models::{Meta, NewUser, User, UserFilter, UserPatch, UserStatus, fields};
use crate::repository::UserRepository;

pub const COLLECTION_NAME: &str = "users";

/// Stored shape of a user. Only this module ever sees the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    #[serde(rename = "_id")]
    id: String,
    first_name: String,
    #[serde(default)]
    last_name: String,
    nick_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    email: String,
    country: String,
    status: UserStatus,
    #[serde(flatten)]
    meta: Meta,
}

impl UserDocument {
    fn new(input: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            first_name: input.first_name,
            last_name: input.last_name,
            nick_name: input.nick_name,
            password: Some(input.password_hash),
            email: input.email,
            country: input.country,
            status: UserStatus::Active,
            meta: Meta::fresh(now),
        }
    }
}

impl From<UserDocument> for User {
    fn from(document: UserDocument) -> Self {
        User {
            id: document.id,
            first_name: document.first_name,
            last_name: document.last_name,
            nick_name: document.nick_name,
            email: document.email,
            country: document.country,
            status: document.status,
            meta: document.meta,
        }
    }
}

fn without_password() -> Document {
    doc! { fields::PASSWORD: 0 }
}

fn by_id(id: &str) -> Document {
    doc! { fields::ID: id }
}

fn timestamp(now: DateTime<Utc>) -> UserResult<Bson> {
    to_bson(&now).map_err(|e| UserError::Internal(format!("failed to encode timestamp: {}", e)))
}

/// `$set` of the provided allow-listed fields plus `updatedAt`, and a
/// `$inc` of `version`.
fn update_document(patch: &UserPatch, now: DateTime<Utc>) -> UserResult<Document> {
    let mut set = doc! { fields::UPDATED_AT: timestamp(now)? };

    let strings = [
        (fields::FIRST_NAME, &patch.first_name),
        (fields::LAST_NAME, &patch.last_name),
        (fields::NICK_NAME, &patch.nick_name),
        (fields::EMAIL, &patch.email),
        (fields::COUNTRY, &patch.country),
    ];
    for (field, value) in strings {
        if let Some(value) = value {
            set.insert(field, value.as_str());
        }
    }
    if let Some(status) = patch.status {
        set.insert(fields::STATUS, status.code());
    }

    Ok(doc! {
        "$set": set,
        "$inc": { fields::VERSION: 1 },
    })
}

/// Other users already holding the patch's email or nickname.
fn uniqueness_clash(id: &str, patch: &UserPatch) -> Option<Document> {
    let mut candidates = Vec::new();
    if let Some(nick_name) = &patch.nick_name {
        candidates.push(doc! { fields::NICK_NAME: nick_name.as_str() });
    }
    if let Some(email) = &patch.email {
        candidates.push(doc! { fields::EMAIL: email.as_str() });
    }

    if candidates.is_empty() {
        return None;
    }

    Some(doc! {
        "$or": candidates,
        fields::ID: { "$ne": id },
    })
}

/// MongoDB implementation of the UserRepository
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION_NAME)
    }

    /// Create a new MongoUserRepository with a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<UserDocument>(collection_name);
        Self { collection }
    }

    /// Ensure the unique email/nickname indexes and the country index.
    ///
    /// Idempotent. Fails if the server does not answer within `timeout`.
    pub async fn create_indexes(&self, timeout: Duration) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { fields::EMAIL: 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_email_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { fields::NICK_NAME: 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_nick_name_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { fields::COUNTRY: 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_country".to_string())
                        .build(),
                )
                .build(),
        ];

        tokio::time::timeout(timeout, self.collection.create_indexes(indexes))
            .await
            .map_err(|_| {
                UserError::Internal(format!("index creation timed out after {:?}", timeout))
            })??;

        tracing::info!("User indexes created successfully");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, input), fields(nick_name = %input.nick_name))]
    async fn create(&self, input: NewUser) -> UserResult<User> {
        let document = UserDocument::new(input, Utc::now());

        match self.collection.insert_one(&document).await {
            Ok(_) => {}
            Err(e) if is_duplicate_key(&e) => return Err(UserError::Duplicate),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %document.id, "User created successfully");
        Ok(document.into())
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: UserPatch) -> UserResult<User> {
        if let Some(clash) = uniqueness_clash(id, &patch) {
            if self.collection.count_documents(clash).await? > 0 {
                return Err(UserError::Duplicate);
            }
        }

        let update = update_document(&patch, Utc::now())?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .projection(without_password())
            .build();

        let updated = self
            .collection
            .find_one_and_update(by_id(id), update)
            .with_options(options)
            .await;

        match updated {
            Ok(Some(document)) => {
                tracing::info!(user_id = %id, version = document.meta.version, "User updated successfully");
                Ok(document.into())
            }
            Ok(None) => Err(UserError::NotFound),
            Err(e) if is_duplicate_key(&e) => Err(UserError::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn list_by_filter(
        &self,
        filter: &UserFilter,
        limit: i64,
        offset: u64,
    ) -> UserResult<(Vec<User>, u64)> {
        let query = filter::to_query(filter);

        let total = self.collection.count_documents(query.clone()).await?;

        let options = FindOptions::builder()
            .limit(limit)
            .skip(offset)
            .sort(doc! { fields::ID: 1 })
            .projection(without_password())
            .build();

        let cursor = self.collection.find(query).with_options(options).await?;
        let documents: Vec<UserDocument> = cursor.try_collect().await?;

        Ok((documents.into_iter().map(User::from).collect(), total))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> UserResult<()> {
        let update = doc! {
            "$set": {
                fields::STATUS: UserStatus::Inactive.code(),
                fields::UPDATED_AT: timestamp(Utc::now())?,
            }
        };
        let options = FindOneAndUpdateOptions::builder()
            .projection(without_password())
            .build();

        let previous = self
            .collection
            .find_one_and_update(by_id(id), update)
            .with_options(options)
            .await?;

        if previous.is_none() {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %id, "User deactivated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> UserResult<User> {
        let options = FindOneOptions::builder()
            .projection(without_password())
            .build();

        self.collection
            .find_one(by_id(id))
            .with_options(options)
            .await?
            .map(User::from)
            .ok_or(UserError::NotFound)
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password(&self, id: &str, password_hash: String) -> UserResult<()> {
        let update = doc! {
            "$set": {
                fields::PASSWORD: password_hash,
                fields::UPDATED_AT: timestamp(Utc::now())?,
            },
            "$inc": { fields::VERSION: 1 },
        };
        let options = FindOneAndUpdateOptions::builder()
            .projection(without_password())
            .build();

        let previous = self
            .collection
            .find_one_and_update(by_id(id), update)
            .with_options(options)
            .await?;

        if previous.is_none() {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = %id, "User password changed");
        Ok(())
    }
}
