//! In-memory implementations of the repository and blob store ports, shared
//! by the service tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{OwnedMutexGuard, OwnedRwLockReadGuard, RwLock};
use uuid::Uuid;

use blog_core::entities::{
    Attachment, Comment, Counters, OwnerType, Post, Reaction, ReactionTarget, User,
};
use blog_core::traits::{
    AttachmentRepository, BlobStore, BlobUpload, CommentRepository, PostRepository,
    PurgeRepository, PurgeTable, ReactionRepository, ReactionUnitOfWork, RepoResult,
    StorageError, StoredBlob,
};
use blog_core::{DomainError, Lifecycle};
use blog_service::{ServiceContext, ServiceSettings};

// ============================================================================
// Blob store
// ============================================================================

/// Blob store keeping objects in a map. Uploads whose bytes equal the
/// configured marker fail. Deletes fail for every object once `fail_deletes`
/// is set, or for single objects named through `fail_delete_of`.
#[derive(Default)]
pub struct FakeBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    delete_calls: Mutex<Vec<String>>,
    uploaded: Mutex<Vec<String>>,
    failing_upload: Mutex<Option<Vec<u8>>>,
    failing_deletes: Mutex<HashSet<String>>,
    fail_first_upload_delete: AtomicBool,
    fail_deletes: AtomicBool,
    upload_calls: AtomicUsize,
}

impl FakeBlobStore {
    pub fn fail_uploads_of(&self, bytes: &[u8]) {
        *self.failing_upload.lock().unwrap() = Some(bytes.to_vec());
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete_of(&self, object_id: &str) {
        self.failing_deletes.lock().unwrap().insert(object_id.to_string());
    }

    /// Make deletes fail for whichever object `upload` stores first
    pub fn fail_delete_of_first_upload(&self) {
        self.fail_first_upload_delete.store(true, Ordering::SeqCst);
    }

    /// Put an object directly, bypassing `upload`
    pub fn insert(&self, object_id: &str) {
        self.objects
            .lock()
            .unwrap()
            .insert(object_id.to_string(), b"seed".to_vec());
    }

    pub fn contains(&self, object_id: &str) -> bool {
        self.objects.lock().unwrap().contains_key(object_id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Every object id `delete` was called with, successful or not
    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }

    /// Object ids of every successful upload, in completion order
    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn upload(&self, upload: BlobUpload) -> Result<StoredBlob, StorageError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.failing_upload.lock().unwrap().as_deref() == Some(upload.bytes.as_slice()) {
            return Err(StorageError::Unavailable("connection reset by peer".to_string()));
        }

        let object_id = format!("attachments/{}", Uuid::new_v4());
        let stored = StoredBlob {
            object_id: object_id.clone(),
            byte_size: upload.len() as i64,
            content_type: upload
                .content_type_hint
                .clone()
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            original_name: upload.original_name.clone(),
        };
        let mut uploaded = self.uploaded.lock().unwrap();
        if uploaded.is_empty() && self.fail_first_upload_delete.load(Ordering::SeqCst) {
            self.fail_delete_of(&object_id);
        }
        uploaded.push(object_id.clone());
        drop(uploaded);
        self.objects.lock().unwrap().insert(object_id, upload.bytes);

        Ok(stored)
    }

    async fn delete(&self, object_id: &str) -> Result<(), StorageError> {
        self.delete_calls.lock().unwrap().push(object_id.to_string());

        if self.fail_deletes.load(Ordering::SeqCst)
            || self.failing_deletes.lock().unwrap().contains(object_id)
        {
            return Err(StorageError::Unavailable("timeout".to_string()));
        }

        self.objects.lock().unwrap().remove(object_id);
        Ok(())
    }
}

// ============================================================================
// Relational store
// ============================================================================

#[derive(Default)]
pub struct Tables {
    pub users: HashMap<Uuid, User>,
    pub posts: HashMap<Uuid, Post>,
    pub comments: HashMap<Uuid, Comment>,
    pub reactions: HashMap<Uuid, Reaction>,
    pub attachments: Vec<Attachment>,
}

impl Tables {
    fn live_counters(&self, target: ReactionTarget) -> Option<Counters> {
        match target {
            ReactionTarget::Post(id) => self
                .posts
                .get(&id)
                .filter(|p| p.lifecycle.is_active())
                .map(Post::counters),
            ReactionTarget::Comment(id) => self
                .comments
                .get(&id)
                .filter(|c| c.lifecycle.is_active())
                .map(Comment::counters),
        }
    }

    fn live_reaction(&self, user_id: Uuid, target: ReactionTarget) -> Option<Reaction> {
        self.reactions
            .values()
            .find(|r| r.user_id == user_id && r.target == target && r.lifecycle.is_active())
            .cloned()
    }

    fn set_counters(&mut self, target: ReactionTarget, counters: Counters) {
        match target {
            ReactionTarget::Post(id) => {
                if let Some(post) = self.posts.get_mut(&id) {
                    post.likes = counters.likes;
                    post.dislikes = counters.dislikes;
                }
            }
            ReactionTarget::Comment(id) => {
                if let Some(comment) = self.comments.get_mut(&id) {
                    comment.likes = counters.likes;
                    comment.dislikes = counters.dislikes;
                }
            }
        }
    }

    fn soft_delete_reactions(&mut self, targets: &[ReactionTarget], at: DateTime<Utc>) {
        for reaction in self.reactions.values_mut() {
            if reaction.lifecycle.is_active() && targets.contains(&reaction.target) {
                reaction.lifecycle = Lifecycle::Deleted { at };
            }
        }
    }

    fn soft_delete_attachments(&mut self, owners: &[(Uuid, OwnerType)], at: DateTime<Utc>) -> u64 {
        let mut count = 0;
        for attachment in &mut self.attachments {
            let owner = (attachment.external_id, attachment.owner_type);
            if attachment.lifecycle.is_active() && owners.contains(&owner) {
                attachment.lifecycle = Lifecycle::Deleted { at };
                count += 1;
            }
        }
        count
    }
}

/// Staged write of a unit of work
enum Op {
    Insert(Reaction),
    SetPolarity(Uuid, bool),
    Delete(Uuid),
    Counters(ReactionTarget, Counters),
}

/// One in-memory database implementing every repository port.
///
/// Reaction units of work serialize per target through a tokio mutex,
/// standing in for `SELECT ... FOR UPDATE`, and buffer their writes until commit.
/// They hold a read guard on the acting user's lock for `FOR SHARE`, which
/// [`InMemoryStore::soft_delete_user`] waits on.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    target_locks: Arc<Mutex<HashMap<ReactionTarget, Arc<tokio::sync::Mutex<()>>>>>,
    user_locks: Arc<Mutex<HashMap<Uuid, Arc<RwLock<()>>>>>,
    events: Arc<Mutex<Vec<&'static str>>>,
    fail_attachment_writes: AtomicBool,
    fail_attachment_purge: AtomicBool,
    failing_purges: Mutex<HashSet<PurgeTable>>,
    owner_queries: AtomicUsize,
}

impl InMemoryStore {
    pub fn with_tables<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        f(&mut self.tables.lock().unwrap())
    }

    pub fn add_user(&self) -> Uuid {
        let id = Uuid::new_v4();
        let name = id.simple();
        let user = User::new(id, format!("user_{name}"), format!("{name}@example.com"));
        self.with_tables(|t| t.users.insert(id, user));
        id
    }

    /// Soft delete a user once no unit of work holds it
    pub async fn soft_delete_user(&self, id: Uuid) {
        let lock = Arc::clone(self.user_locks.lock().unwrap().entry(id).or_default());
        let _guard = lock.write_owned().await;
        self.with_tables(|t| {
            if let Some(user) = t.users.get_mut(&id) {
                user.lifecycle = Lifecycle::Deleted { at: Utc::now() };
            }
        });
    }

    pub fn user_is_live(&self, id: Uuid) -> bool {
        self.with_tables(|t| t.users.get(&id).is_some_and(|u| u.lifecycle.is_active()))
    }

    pub fn add_post(&self, author_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        let post = Post::new(id, author_id, "Title".to_string(), "Body".to_string());
        self.with_tables(|t| t.posts.insert(id, post));
        id
    }

    pub fn add_comment(&self, post_id: Uuid, author_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        let comment = Comment::new(id, post_id, author_id, "Nice post".to_string());
        self.with_tables(|t| t.comments.insert(id, comment));
        id
    }

    pub fn add_reaction(&self, user_id: Uuid, target: ReactionTarget, is_liked: bool) -> Uuid {
        let reaction = Reaction::new(Uuid::new_v4(), user_id, target, is_liked);
        let id = reaction.id;
        self.with_tables(|t| t.reactions.insert(id, reaction));
        id
    }

    pub fn add_attachment(&self, owner_id: Uuid, owner_type: OwnerType) -> Attachment {
        let blob = StoredBlob {
            object_id: format!("attachments/{}", Uuid::new_v4()),
            byte_size: 4,
            content_type: "image/png".to_string(),
            original_name: None,
        };
        let attachment = Attachment::from_stored(Uuid::new_v4(), owner_id, owner_type, blob);
        self.with_tables(|t| t.attachments.push(attachment.clone()));
        attachment
    }

    pub fn post(&self, id: Uuid) -> Option<Post> {
        self.with_tables(|t| t.posts.get(&id).cloned())
    }

    pub fn comment(&self, id: Uuid) -> Option<Comment> {
        self.with_tables(|t| t.comments.get(&id).cloned())
    }

    /// Counters recomputed from the live reaction rows
    pub fn ledger_counts(&self, target: ReactionTarget) -> Counters {
        self.with_tables(|t| {
            let live = t
                .reactions
                .values()
                .filter(|r| r.target == target && r.lifecycle.is_active());
            let likes = live.clone().filter(|r| r.is_liked).count() as i64;
            let dislikes = live.filter(|r| !r.is_liked).count() as i64;
            Counters::new(likes, dislikes)
        })
    }

    /// Counters stored on the target row
    pub fn stored_counts(&self, target: ReactionTarget) -> Counters {
        self.with_tables(|t| match target {
            ReactionTarget::Post(id) => t.posts.get(&id).map(Post::counters),
            ReactionTarget::Comment(id) => t.comments.get(&id).map(Comment::counters),
        })
        .unwrap_or_default()
    }

    pub fn live_reaction_count(&self, target: ReactionTarget) -> usize {
        self.with_tables(|t| {
            t.reactions
                .values()
                .filter(|r| r.target == target && r.lifecycle.is_active())
                .count()
        })
    }

    pub fn attachment_rows(&self) -> Vec<Attachment> {
        self.with_tables(|t| t.attachments.clone())
    }

    /// Mark every row in every table as soft-deleted at `at`
    pub fn soft_delete_everything(&self, at: DateTime<Utc>) {
        self.with_tables(|t| {
            let deleted = Lifecycle::Deleted { at };
            t.users.values_mut().for_each(|u| u.lifecycle = deleted);
            t.posts.values_mut().for_each(|p| p.lifecycle = deleted);
            t.comments.values_mut().for_each(|c| c.lifecycle = deleted);
            t.reactions.values_mut().for_each(|r| r.lifecycle = deleted);
            t.attachments.iter_mut().for_each(|a| a.lifecycle = deleted);
        });
    }

    /// Order in which purge steps touched the tables
    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    pub fn fail_attachment_writes(&self, fail: bool) {
        self.fail_attachment_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_attachment_purge(&self, fail: bool) {
        self.fail_attachment_purge.store(fail, Ordering::SeqCst);
    }

    pub fn fail_purge_of(&self, table: PurgeTable) {
        self.failing_purges.lock().unwrap().insert(table);
    }

    pub fn owner_queries(&self) -> usize {
        self.owner_queries.load(Ordering::SeqCst)
    }

    fn record(&self, event: &'static str) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn soft_delete_cascade(&self, id: Uuid) -> RepoResult<()> {
        let now = Utc::now();
        self.with_tables(|t| {
            let post = t
                .posts
                .get_mut(&id)
                .filter(|p| p.lifecycle.is_active())
                .ok_or(DomainError::PostNotFound(id))?;
            post.lifecycle = Lifecycle::Deleted { at: now };

            let mut targets = vec![ReactionTarget::Post(id)];
            let mut owners = vec![(id, OwnerType::Post)];
            for comment in t.comments.values_mut() {
                if comment.post_id == id && comment.lifecycle.is_active() {
                    comment.lifecycle = Lifecycle::Deleted { at: now };
                    targets.push(ReactionTarget::Comment(comment.id));
                    owners.push((comment.id, OwnerType::Comment));
                }
            }

            t.soft_delete_reactions(&targets, now);
            t.soft_delete_attachments(&owners, now);
            Ok(())
        })
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn soft_delete_cascade(&self, id: Uuid) -> RepoResult<()> {
        let now = Utc::now();
        self.with_tables(|t| {
            let comment = t
                .comments
                .get_mut(&id)
                .filter(|c| c.lifecycle.is_active())
                .ok_or(DomainError::CommentNotFound(id))?;
            comment.lifecycle = Lifecycle::Deleted { at: now };

            t.soft_delete_reactions(&[ReactionTarget::Comment(id)], now);
            t.soft_delete_attachments(&[(id, OwnerType::Comment)], now);
            Ok(())
        })
    }
}

#[async_trait]
impl AttachmentRepository for InMemoryStore {
    async fn find_by_owners(
        &self,
        owner_ids: &[Uuid],
        owner_type: OwnerType,
    ) -> RepoResult<Vec<Attachment>> {
        self.owner_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.with_tables(|t| {
            t.attachments
                .iter()
                .filter(|a| a.owner_type == owner_type && owner_ids.contains(&a.external_id))
                .filter(|a| a.lifecycle.is_active())
                .cloned()
                .collect()
        }))
    }

    async fn create(&self, attachment: &Attachment) -> RepoResult<()> {
        self.create_many(std::slice::from_ref(attachment)).await
    }

    async fn create_many(&self, attachments: &[Attachment]) -> RepoResult<()> {
        if self.fail_attachment_writes.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("connection closed".to_string()));
        }
        self.with_tables(|t| t.attachments.extend_from_slice(attachments));
        Ok(())
    }

    async fn soft_delete_by_owner(
        &self,
        owner_id: Uuid,
        owner_type: OwnerType,
    ) -> RepoResult<u64> {
        let owners = [(owner_id, owner_type)];
        Ok(self.with_tables(|t| t.soft_delete_attachments(&owners, Utc::now())))
    }

    async fn purge_deleted_before(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<Attachment>> {
        self.record("attachments");
        if self.fail_attachment_purge.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("lock timeout".to_string()));
        }

        Ok(self.with_tables(|t| {
            let (purged, kept) = std::mem::take(&mut t.attachments)
                .into_iter()
                .partition(|a| a.lifecycle.is_purgeable(cutoff));
            t.attachments = kept;
            purged
        }))
    }
}

#[async_trait]
impl PurgeRepository for InMemoryStore {
    async fn purge_deleted_before(
        &self,
        table: PurgeTable,
        cutoff: DateTime<Utc>,
    ) -> RepoResult<u64> {
        self.record(table.as_str());
        tokio::task::yield_now().await;

        if self.failing_purges.lock().unwrap().contains(&table) {
            return Err(DomainError::DatabaseError(format!("{table} is locked")));
        }

        let purged = self.with_tables(|t| {
            let before;
            let after;
            match table {
                PurgeTable::Reactions => {
                    before = t.reactions.len();
                    t.reactions.retain(|_, r| !r.lifecycle.is_purgeable(cutoff));
                    after = t.reactions.len();
                }
                PurgeTable::Comments => {
                    before = t.comments.len();
                    t.comments.retain(|_, c| !c.lifecycle.is_purgeable(cutoff));
                    after = t.comments.len();
                }
                PurgeTable::Posts => {
                    before = t.posts.len();
                    t.posts.retain(|_, p| !p.lifecycle.is_purgeable(cutoff));
                    after = t.posts.len();
                }
                PurgeTable::Users => {
                    before = t.users.len();
                    t.users.retain(|_, u| !u.lifecycle.is_purgeable(cutoff));
                    after = t.users.len();
                }
                // Not modelled in memory
                PurgeTable::Categories | PurgeTable::Roles => {
                    before = 0;
                    after = 0;
                }
            }
            (before - after) as u64
        });

        Ok(purged)
    }
}

#[async_trait]
impl ReactionRepository for InMemoryStore {
    async fn find(&self, user_id: Uuid, target: ReactionTarget) -> RepoResult<Option<Reaction>> {
        Ok(self.with_tables(|t| t.live_reaction(user_id, target)))
    }

    async fn begin(&self) -> RepoResult<Box<dyn ReactionUnitOfWork>> {
        Ok(Box::new(InMemoryUnitOfWork {
            tables: Arc::clone(&self.tables),
            target_locks: Arc::clone(&self.target_locks),
            user_locks: Arc::clone(&self.user_locks),
            guard: None,
            user_guard: None,
            staged: Vec::new(),
        }))
    }
}

pub struct InMemoryUnitOfWork {
    tables: Arc<Mutex<Tables>>,
    target_locks: Arc<Mutex<HashMap<ReactionTarget, Arc<tokio::sync::Mutex<()>>>>>,
    user_locks: Arc<Mutex<HashMap<Uuid, Arc<RwLock<()>>>>>,
    guard: Option<OwnedMutexGuard<()>>,
    user_guard: Option<OwnedRwLockReadGuard<()>>,
    staged: Vec<Op>,
}

#[async_trait]
impl ReactionUnitOfWork for InMemoryUnitOfWork {
    async fn lock_user(&mut self, user_id: Uuid) -> RepoResult<bool> {
        let lock = Arc::clone(self.user_locks.lock().unwrap().entry(user_id).or_default());
        self.user_guard = Some(lock.read_owned().await);

        let live = |u: &User| u.lifecycle.is_active();
        Ok(self.tables.lock().unwrap().users.get(&user_id).is_some_and(live))
    }

    async fn lock_target(&mut self, target: ReactionTarget) -> RepoResult<Option<Counters>> {
        let lock = Arc::clone(self.target_locks.lock().unwrap().entry(target).or_default());
        self.guard = Some(lock.lock_owned().await);

        Ok(self.tables.lock().unwrap().live_counters(target))
    }

    async fn find_reaction(
        &mut self,
        user_id: Uuid,
        target: ReactionTarget,
    ) -> RepoResult<Option<Reaction>> {
        let found = self.tables.lock().unwrap().live_reaction(user_id, target);
        // Widen the window between read and write so missing locks would show up
        tokio::task::yield_now().await;
        Ok(found)
    }

    async fn insert_reaction(&mut self, reaction: &Reaction) -> RepoResult<()> {
        self.staged.push(Op::Insert(reaction.clone()));
        Ok(())
    }

    async fn set_polarity(&mut self, reaction_id: Uuid, is_liked: bool) -> RepoResult<()> {
        self.staged.push(Op::SetPolarity(reaction_id, is_liked));
        Ok(())
    }

    async fn delete_reaction(&mut self, reaction_id: Uuid) -> RepoResult<()> {
        self.staged.push(Op::Delete(reaction_id));
        Ok(())
    }

    async fn write_counters(
        &mut self,
        target: ReactionTarget,
        counters: Counters,
    ) -> RepoResult<()> {
        self.staged.push(Op::Counters(target, counters));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let this = *self;
        let mut tables = this.tables.lock().unwrap();

        for op in this.staged {
            match op {
                Op::Insert(reaction) => {
                    if tables.live_reaction(reaction.user_id, reaction.target).is_some() {
                        return Err(DomainError::Conflict("duplicate reaction".to_string()));
                    }
                    tables.reactions.insert(reaction.id, reaction);
                }
                Op::SetPolarity(id, is_liked) => {
                    if let Some(reaction) = tables.reactions.get_mut(&id) {
                        reaction.is_liked = is_liked;
                    }
                }
                Op::Delete(id) => {
                    tables.reactions.remove(&id);
                }
                Op::Counters(target, counters) => {
                    if counters.likes < 0 || counters.dislikes < 0 {
                        let msg = "counter check constraint violated".to_string();
                        return Err(DomainError::DatabaseError(msg));
                    }
                    tables.set_counters(target, counters);
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub blobs: Arc<FakeBlobStore>,
    pub ctx: ServiceContext,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(ServiceSettings::default())
    }

    pub fn with_settings(settings: ServiceSettings) -> Self {
        let store = Arc::new(InMemoryStore::default());
        let blobs = Arc::new(FakeBlobStore::default());

        let ctx = ServiceContext::builder()
            .post_repo(store.clone())
            .comment_repo(store.clone())
            .attachment_repo(store.clone())
            .reaction_repo(store.clone())
            .purge_repo(store.clone())
            .blob_store(blobs.clone())
            .settings(settings)
            .build()
            .expect("all dependencies provided");

        Self { store, blobs, ctx }
    }
}
