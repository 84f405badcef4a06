//! Comments and documents attached to issues.
//!
//! Both are frozen once their issue is completed: nothing can be added, edited or removed.

use crate::access::{self, Actor};
use crate::constants::DOCUMENT_EXTENSIONS;
use crate::error::{CoreError, CoreResult};
use crate::model::{Comment, CommentId, CommentView, Document, DocumentId, IssueId};
use crate::repositories::issues::comment_view;
use crate::store::Store;
use crate::validation::{validate_document_size, validate_file_extension};
use chrono::Utc;
use std::sync::Arc;
use yaqeen_types::NonEmptyText;

fn comment_content(content: &str) -> CoreResult<String> {
    NonEmptyText::new(content)
        .map(NonEmptyText::into_string)
        .map_err(|e| CoreError::invalid("content", e))
}

#[derive(Clone)]
pub struct AttachmentService {
    store: Arc<Store>,
}

impl AttachmentService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Comments on issues visible to the caller, optionally limited to one issue.
    pub fn list_comments(
        &self,
        actor: &Actor,
        issue: Option<IssueId>,
    ) -> CoreResult<Vec<CommentView>> {
        self.store.read(|tables| {
            if let Some(id) = issue {
                access::visible_issue(actor, tables, id)?;
            }
            tables
                .comments
                .values()
                .filter(|c| issue.map_or(true, |id| c.issue_id == id))
                .filter(|c| {
                    tables
                        .issues
                        .get(&c.issue_id)
                        .is_some_and(|i| access::can_view_issue(actor, i, tables))
                })
                .map(|c| comment_view(tables, c))
                .collect()
        })
    }

    pub fn get_comment(&self, actor: &Actor, id: CommentId) -> CoreResult<CommentView> {
        self.store.read(|tables| {
            let comment = access::visible_comment(actor, tables, id)?;
            comment_view(tables, comment)
        })
    }

    /// Comment on an issue the caller can see, as its patient or assigned doctor.
    pub fn create_comment(
        &self,
        actor: &Actor,
        issue_id: IssueId,
        content: &str,
    ) -> CoreResult<CommentView> {
        let content = comment_content(content)?;
        let now = Utc::now();

        let view = self.store.write(|tables| {
            let issue = access::visible_issue(actor, tables, issue_id)?;
            access::ensure_open(issue)?;

            let id = tables.next_comment_id();
            let comment = Comment {
                id,
                issue_id,
                author_id: actor.user_id,
                content,
                created_at: now,
                updated_at: now,
            };
            tables.comments.insert(id, comment.clone());
            comment_view(tables, &comment)
        })?;

        tracing::info!(comment_id = %view.comment.id, issue_id = %issue_id, "added comment");
        Ok(view)
    }

    pub fn update_comment(
        &self,
        actor: &Actor,
        id: CommentId,
        content: &str,
    ) -> CoreResult<CommentView> {
        let content = comment_content(content)?;

        self.store.write(|tables| {
            let comment = access::visible_comment(actor, tables, id)?;
            if comment.author_id != actor.user_id {
                return Err(CoreError::forbidden("only the author may edit a comment"));
            }
            access::ensure_open(tables.issue(comment.issue_id)?)?;

            let comment = tables
                .comments
                .get_mut(&id)
                .ok_or_else(|| CoreError::not_found("comment", id))?;
            comment.content = content;
            comment.updated_at = Utc::now();
            let comment = comment.clone();
            comment_view(tables, &comment)
        })
    }

    pub fn delete_comment(&self, actor: &Actor, id: CommentId) -> CoreResult<()> {
        self.store.write(|tables| {
            let comment = access::visible_comment(actor, tables, id)?;
            if comment.author_id != actor.user_id {
                return Err(CoreError::forbidden("only the author may delete a comment"));
            }
            access::ensure_open(tables.issue(comment.issue_id)?)?;
            tables.comments.remove(&id);
            Ok(())
        })
    }

    /// Documents on issues visible to the caller, optionally limited to one issue.
    pub fn list_documents(&self, actor: &Actor, issue: Option<IssueId>) -> CoreResult<Vec<Document>> {
        self.store.read(|tables| {
            if let Some(id) = issue {
                access::visible_issue(actor, tables, id)?;
            }
            Ok(tables
                .documents
                .values()
                .filter(|d| issue.map_or(true, |id| d.issue_id == id))
                .filter(|d| {
                    tables
                        .issues
                        .get(&d.issue_id)
                        .is_some_and(|i| access::can_view_issue(actor, i, tables))
                })
                .cloned()
                .collect())
        })
    }

    pub fn get_document(&self, actor: &Actor, id: DocumentId) -> CoreResult<Document> {
        self.store
            .read(|tables| access::visible_document(actor, tables, id).cloned())
    }

    /// Record a document on an issue the caller can see.
    pub fn create_document(
        &self,
        actor: &Actor,
        issue_id: IssueId,
        file_name: &str,
        size_bytes: u64,
    ) -> CoreResult<Document> {
        let file_name = validate_file_extension(file_name, DOCUMENT_EXTENSIONS)?;
        validate_document_size(size_bytes)?;
        let now = Utc::now();

        let document = self.store.write(|tables| {
            let issue = access::visible_issue(actor, tables, issue_id)?;
            access::ensure_open(issue)?;

            let id = tables.next_document_id();
            let document = Document {
                id,
                issue_id,
                file_name,
                size_bytes,
                uploaded_at: now,
            };
            tables.documents.insert(id, document.clone());
            Ok(document)
        })?;

        tracing::info!(document_id = %document.id, issue_id = %issue_id, "added document");
        Ok(document)
    }

    /// Remove a document; only the issue's patient may, and only while the issue is open.
    pub fn delete_document(&self, actor: &Actor, id: DocumentId) -> CoreResult<()> {
        self.store.write(|tables| {
            let document = access::visible_document(actor, tables, id)?;
            let issue = tables.issue(document.issue_id)?;
            if !access::owns_issue(actor, issue, tables) {
                return Err(CoreError::forbidden(
                    "only the patient who raised the issue may remove its documents",
                ));
            }
            access::ensure_open(issue)?;
            tables.documents.remove(&id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Specialty;
    use crate::repositories::test_support::Fixture;

    #[test]
    fn comment_author_is_rendered_with_role() {
        let fx = Fixture::new();
        let (alice, _) = fx.patient("alice", 30);
        let doc = fx.doctor("dra", Specialty::Radiology, "LIC-1");
        let issue = fx.issue_for(&alice, Some(doc.user_id));

        let view = fx.attachments.create_comment(&doc, issue, "Please upload the scan").unwrap();
        assert_eq!(view.author, "Dra Tester (doctor)");
        assert_eq!(fx.attachments.list_comments(&alice, Some(issue)).unwrap().len(), 1);
        assert_eq!(fx.issues.get_issue(&alice, issue).unwrap().comments.len(), 1);
    }

    #[test]
    fn unrelated_users_cannot_comment() {
        let fx = Fixture::new();
        let (alice, _) = fx.patient("alice", 30);
        let (bob, _) = fx.patient("bob", 40);
        let doc = fx.doctor("dra", Specialty::Radiology, "LIC-1");
        let issue = fx.issue_for(&alice, None);

        assert!(matches!(
            fx.attachments.create_comment(&bob, issue, "hi"),
            Err(CoreError::NotFound { .. })
        ));
        // unassigned issues are not visible to doctors either
        assert!(matches!(
            fx.attachments.create_comment(&doc, issue, "hi"),
            Err(CoreError::NotFound { .. })
        ));
        assert!(fx.attachments.list_comments(&bob, None).unwrap().is_empty());
    }

    #[test]
    fn only_author_edits_comment() {
        let fx = Fixture::new();
        let (alice, _) = fx.patient("alice", 30);
        let doc = fx.doctor("dra", Specialty::Radiology, "LIC-1");
        let issue = fx.issue_for(&alice, Some(doc.user_id));
        let view = fx.attachments.create_comment(&alice, issue, "first").unwrap();

        assert!(matches!(
            fx.attachments.update_comment(&doc, view.comment.id, "hijack"),
            Err(CoreError::Forbidden(_))
        ));
        let edited = fx
            .attachments
            .update_comment(&alice, view.comment.id, "second")
            .unwrap();
        assert_eq!(edited.comment.content, "second");
        assert!(matches!(
            fx.attachments.update_comment(&alice, view.comment.id, "   "),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn completed_issue_freezes_attachments() {
        let fx = Fixture::new();
        let (alice, _) = fx.patient("alice", 30);
        let doc = fx.doctor("dra", Specialty::Radiology, "LIC-1");
        let issue = fx.issue_for(&alice, Some(doc.user_id));
        let comment = fx.attachments.create_comment(&alice, issue, "note").unwrap();
        let document = fx
            .attachments
            .create_document(&alice, issue, "xray.png", 2048)
            .unwrap();

        fx.issues.accept_issue(&doc, issue).unwrap();
        fx.issues.complete_issue(&doc, issue).unwrap();

        assert!(matches!(
            fx.attachments.create_comment(&doc, issue, "late"),
            Err(CoreError::IssueCompleted(_))
        ));
        assert!(matches!(
            fx.attachments.update_comment(&alice, comment.comment.id, "edit"),
            Err(CoreError::IssueCompleted(_))
        ));
        assert!(matches!(
            fx.attachments.delete_comment(&alice, comment.comment.id),
            Err(CoreError::IssueCompleted(_))
        ));
        assert!(matches!(
            fx.attachments.create_document(&alice, issue, "late.pdf", 10),
            Err(CoreError::IssueCompleted(_))
        ));
        assert!(matches!(
            fx.attachments.delete_document(&alice, document.id),
            Err(CoreError::IssueCompleted(_))
        ));
        // reading still works
        assert_eq!(fx.attachments.list_documents(&doc, Some(issue)).unwrap().len(), 1);
    }

    #[test]
    fn documents_are_validated_and_removed_by_owner_only() {
        let fx = Fixture::new();
        let (alice, _) = fx.patient("alice", 30);
        let doc = fx.doctor("dra", Specialty::Radiology, "LIC-1");
        let issue = fx.issue_for(&alice, Some(doc.user_id));

        assert!(matches!(
            fx.attachments.create_document(&alice, issue, "notes.docx", 10),
            Err(CoreError::InvalidInput(_))
        ));
        let report = fx
            .attachments
            .create_document(&doc, issue, "report.pdf", 4096)
            .unwrap();
        assert!(matches!(
            fx.attachments.delete_document(&doc, report.id),
            Err(CoreError::Forbidden(_))
        ));
        fx.attachments.delete_document(&alice, report.id).unwrap();
        assert!(fx.attachments.get_document(&alice, report.id).is_err());
    }
}
