//! End-to-end service behaviour over the in-memory store.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use quill_core::domain::{Category, Comment, Location, Post, User};
use quill_core::error::DomainError;
use quill_core::forms::{CommentForm, PostForm, ProfileForm};
use quill_core::pagination::PageRequest;
use quill_core::{BlogService, Outcome, Redirect, Repositories, Viewer};
use quill_infra::InMemoryStore;

struct Blog {
    service: BlogService,
    repos: Repositories,
}

impl Blog {
    fn new() -> Self {
        let repos = InMemoryStore::repositories(Arc::new(InMemoryStore::new()));
        Self {
            service: BlogService::new(repos.clone()),
            repos,
        }
    }

    async fn user(&self, username: &str) -> (User, Viewer) {
        let user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            "hash".to_string(),
        );
        let user = self.repos.users.insert(user).await.unwrap();
        let viewer = Viewer::new(user.id);
        (user, viewer)
    }

    async fn category(&self, slug: &str, published: bool) -> Category {
        let mut category =
            Category::new(format!("About {slug}"), String::new(), slug.to_string()).unwrap();
        category.is_published = published;
        self.repos.categories.insert(category).await.unwrap()
    }

    async fn post(&self, post: Post) -> Post {
        self.repos.posts.insert(post).await.unwrap()
    }

    async fn comment(&self, post: &Post, author: &User, text: &str) -> Comment {
        self.repos
            .comments
            .insert(Comment::new(post.id, author.id, text.to_string()))
            .await
            .unwrap()
    }
}

fn post_by(author: &User, title: &str, hours_from_now: i64) -> Post {
    Post::new(
        author.id,
        title.to_string(),
        format!("{title} body"),
        Utc::now() + TimeDelta::hours(hours_from_now),
    )
}

fn post_form(title: &str) -> PostForm {
    PostForm {
        title: title.to_string(),
        text: "Some text".to_string(),
        pub_date: "2020-05-01T12:00".to_string(),
        ..PostForm::default()
    }
}

#[tokio::test]
async fn test_scheduled_post_is_seen_only_by_its_author() {
    let blog = Blog::new();
    let (ann, ann_viewer) = blog.user("ann").await;
    let (_, bob_viewer) = blog.user("bob").await;
    let post = blog.post(post_by(&ann, "Tomorrow", 24)).await;

    let index = blog.service.index(PageRequest::default()).await.unwrap();
    assert!(index.items.is_empty());

    let anonymous = blog.service.post_detail(post.id, None).await;
    assert!(matches!(anonymous, Err(DomainError::NotFound { .. })));
    let stranger = blog.service.post_detail(post.id, Some(&bob_viewer)).await;
    assert!(matches!(stranger, Err(DomainError::NotFound { .. })));

    let own = blog
        .service
        .post_detail(post.id, Some(&ann_viewer))
        .await
        .unwrap();
    assert_eq!(own.card.post.id, post.id);

    let profile = blog
        .service
        .profile("ann", Some(&ann_viewer), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(profile.page.total_items, 1);

    let public_profile = blog
        .service
        .profile("ann", None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(public_profile.page.total_items, 0);
}

#[tokio::test]
async fn test_unpublished_post_and_category_are_hidden() {
    let blog = Blog::new();
    let (ann, _) = blog.user("ann").await;
    let hidden_category = blog.category("secret", false).await;
    let open_category = blog.category("travel", true).await;

    blog.post(post_by(&ann, "Draft", -1).unpublished()).await;
    blog.post(post_by(&ann, "In hidden", -1).with_category(hidden_category.id))
        .await;
    let visible = blog
        .post(post_by(&ann, "Trip", -1).with_category(open_category.id))
        .await;

    let index = blog.service.index(PageRequest::default()).await.unwrap();
    let ids: Vec<Uuid> = index.items.iter().map(|c| c.post.id).collect();
    assert_eq!(ids, vec![visible.id]);

    let missing = blog
        .service
        .category_posts("secret", PageRequest::default())
        .await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));

    let travel = blog
        .service
        .category_posts("travel", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(travel.category.slug, "travel");
    assert_eq!(travel.page.items.len(), 1);
}

#[tokio::test]
async fn test_index_paginates_newest_first() {
    let blog = Blog::new();
    let (ann, _) = blog.user("ann").await;
    for i in 0..25 {
        blog.post(post_by(&ann, &format!("Post {i}"), -(i + 1))).await;
    }

    let first = blog.service.index(PageRequest::new(1)).await.unwrap();
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.items[0].post.title, "Post 0");

    let third = blog.service.index(PageRequest::new(3)).await.unwrap();
    assert_eq!(third.items.len(), 5);
    assert_eq!(third.items[4].post.title, "Post 24");

    let beyond = blog.service.index(PageRequest::new(4)).await.unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_pages, 3);

    let garbage = blog
        .service
        .index(PageRequest::parse(Some("abc")))
        .await
        .unwrap();
    assert_eq!(garbage.number, 1);
}

#[tokio::test]
async fn test_post_detail_lists_comments_oldest_first() {
    let blog = Blog::new();
    let (ann, _) = blog.user("ann").await;
    let (bob, _) = blog.user("bob").await;
    let post = blog.post(post_by(&ann, "Hello", -1)).await;

    blog.comment(&post, &bob, "first").await;
    blog.comment(&post, &ann, "second").await;

    let detail = blog.service.post_detail(post.id, None).await.unwrap();
    let texts: Vec<&str> = detail
        .comments
        .iter()
        .map(|c| c.comment.text.as_str())
        .collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(detail.card.comment_count, 2);
    assert_eq!(detail.comments[0].author.username, "bob");
}

#[tokio::test]
async fn test_create_post_redirects_to_profile() {
    let blog = Blog::new();
    let (ann, ann_viewer) = blog.user("ann").await;

    let outcome = blog
        .service
        .save_post(&ann_viewer, None, post_form("Fresh"))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Redirect(Redirect::Profile("ann".into())));

    let profile = blog
        .service
        .profile("ann", None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(profile.page.items.len(), 1);
    assert_eq!(profile.page.items[0].post.title, "Fresh");
    assert_eq!(profile.page.items[0].author.id, ann.id);
}

#[tokio::test]
async fn test_invalid_post_form_is_rendered_back() {
    let blog = Blog::new();
    let (_, ann_viewer) = blog.user("ann").await;

    let form = PostForm {
        category: Uuid::new_v4().to_string(),
        ..post_form("")
    };
    let outcome = blog
        .service
        .save_post(&ann_viewer, None, form.clone())
        .await
        .unwrap();

    let Outcome::Render(state) = outcome else {
        panic!("expected the form to be re-rendered");
    };
    assert_eq!(state.data, form);
    assert!(!state.errors.field("title").is_empty());

    // Field errors first; references are only checked on otherwise clean input
    let outcome = blog
        .service
        .save_post(
            &ann_viewer,
            None,
            PostForm {
                title: "Ok".into(),
                ..form
            },
        )
        .await
        .unwrap();
    let Outcome::Render(state) = outcome else {
        panic!("expected the form to be re-rendered");
    };
    assert!(!state.errors.field("category").is_empty());

    let index = blog.service.index(PageRequest::default()).await.unwrap();
    assert!(index.items.is_empty());
}

#[tokio::test]
async fn test_non_author_cannot_edit_or_delete_post() {
    let blog = Blog::new();
    let (ann, _) = blog.user("ann").await;
    let (_, bob_viewer) = blog.user("bob").await;
    let post = blog.post(post_by(&ann, "Mine", -1)).await;

    let form = blog
        .service
        .post_form(&bob_viewer, Some(post.id))
        .await
        .unwrap();
    assert_eq!(form, Outcome::Redirect(Redirect::PostDetail(post.id)));

    let saved = blog
        .service
        .save_post(&bob_viewer, Some(post.id), post_form("Hijacked"))
        .await
        .unwrap();
    assert_eq!(saved, Outcome::Redirect(Redirect::PostDetail(post.id)));

    let deleted = blog.service.delete_post(&bob_viewer, post.id).await.unwrap();
    assert_eq!(deleted, Redirect::PostDetail(post.id));

    let stored = blog.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored, post);
}

#[tokio::test]
async fn test_edit_keeps_author_and_image() {
    let blog = Blog::new();
    let (ann, ann_viewer) = blog.user("ann").await;
    let mut post = post_by(&ann, "Before", -1);
    post.image = Some("posts_images/cat.png".into());
    let post = blog.post(post).await;

    let outcome = blog
        .service
        .save_post(&ann_viewer, Some(post.id), post_form("After"))
        .await
        .unwrap();
    assert!(outcome.is_redirect());

    let stored = blog.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "After");
    assert_eq!(stored.author_id, ann.id);
    assert_eq!(stored.image.as_deref(), Some("posts_images/cat.png"));
    assert_eq!(stored.created_at, post.created_at);
}

#[tokio::test]
async fn test_author_deletes_post_with_its_comments() {
    let blog = Blog::new();
    let (ann, ann_viewer) = blog.user("ann").await;
    let post = blog.post(post_by(&ann, "Gone", -1)).await;
    let comment = blog.comment(&post, &ann, "bye").await;

    let redirect = blog.service.delete_post(&ann_viewer, post.id).await.unwrap();
    assert_eq!(redirect, Redirect::Profile("ann".into()));

    assert!(blog.repos.posts.find_by_id(post.id).await.unwrap().is_none());
    assert!(
        blog.repos
            .comments
            .find_by_id(comment.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_comment_lifecycle() {
    let blog = Blog::new();
    let (ann, _) = blog.user("ann").await;
    let (_, bob_viewer) = blog.user("bob").await;
    let post = blog.post(post_by(&ann, "Talk", -1)).await;

    let outcome = blog
        .service
        .save_comment(
            &bob_viewer,
            post.id,
            None,
            CommentForm {
                text: "Nice".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Redirect(Redirect::PostDetail(post.id)));

    let comments = blog.repos.comments.find_by_post(post.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    let comment_id = comments[0].id;

    let Outcome::Render(page) = blog
        .service
        .comment_form(&bob_viewer, post.id, Some(comment_id))
        .await
        .unwrap()
    else {
        panic!("expected the edit form");
    };
    assert_eq!(page.form.data.text, "Nice");

    blog.service
        .save_comment(
            &bob_viewer,
            post.id,
            Some(comment_id),
            CommentForm {
                text: "Very nice".into(),
            },
        )
        .await
        .unwrap();
    let stored = blog.repos.comments.find_by_id(comment_id).await.unwrap().unwrap();
    assert_eq!(stored.text, "Very nice");

    let redirect = blog
        .service
        .delete_comment(&bob_viewer, post.id, comment_id)
        .await
        .unwrap();
    assert_eq!(redirect, Redirect::PostDetail(post.id));
    assert_eq!(blog.repos.comments.count_by_post(post.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_blank_comment_is_rejected() {
    let blog = Blog::new();
    let (ann, ann_viewer) = blog.user("ann").await;
    let post = blog.post(post_by(&ann, "Talk", -1)).await;

    let outcome = blog
        .service
        .save_comment(
            &ann_viewer,
            post.id,
            None,
            CommentForm { text: "   ".into() },
        )
        .await
        .unwrap();

    let Outcome::Render(page) = outcome else {
        panic!("expected the form to be re-rendered");
    };
    assert!(!page.form.errors.field("text").is_empty());
    assert_eq!(blog.repos.comments.count_by_post(post.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_non_author_cannot_touch_comment() {
    let blog = Blog::new();
    let (ann, ann_viewer) = blog.user("ann").await;
    let (bob, _) = blog.user("bob").await;
    let post = blog.post(post_by(&ann, "Talk", -1)).await;
    let comment = blog.comment(&post, &bob, "mine").await;

    let edited = blog
        .service
        .save_comment(
            &ann_viewer,
            post.id,
            Some(comment.id),
            CommentForm {
                text: "censored".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(edited, Outcome::Redirect(Redirect::PostDetail(post.id)));

    let deleted = blog
        .service
        .delete_comment(&ann_viewer, post.id, comment.id)
        .await
        .unwrap();
    assert_eq!(deleted, Redirect::PostDetail(post.id));

    let stored = blog.repos.comments.find_by_id(comment.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "mine");
}

#[tokio::test]
async fn test_comment_under_wrong_post_is_not_found() {
    let blog = Blog::new();
    let (ann, ann_viewer) = blog.user("ann").await;
    let first = blog.post(post_by(&ann, "One", -1)).await;
    let second = blog.post(post_by(&ann, "Two", -1)).await;
    let comment = blog.comment(&first, &ann, "here").await;

    let result = blog
        .service
        .delete_comment_form(&ann_viewer, second.id, comment.id)
        .await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_commenting_on_hidden_post_is_not_found() {
    let blog = Blog::new();
    let (ann, _) = blog.user("ann").await;
    let (_, bob_viewer) = blog.user("bob").await;
    let draft = blog.post(post_by(&ann, "Draft", -1).unpublished()).await;

    let result = blog
        .service
        .save_comment(
            &bob_viewer,
            draft.id,
            None,
            CommentForm { text: "hi".into() },
        )
        .await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_deleting_user_removes_their_posts_and_comments() {
    let blog = Blog::new();
    let (ann, _) = blog.user("ann").await;
    let (bob, _) = blog.user("bob").await;
    let anns_post = blog.post(post_by(&ann, "Ann's", -1)).await;
    let bobs_post = blog.post(post_by(&bob, "Bob's", -1)).await;
    blog.comment(&anns_post, &bob, "on ann's").await;
    let anns_comment = blog.comment(&bobs_post, &ann, "on bob's").await;

    blog.repos.users.delete(ann.id).await.unwrap();

    assert!(blog.repos.posts.find_by_id(anns_post.id).await.unwrap().is_none());
    assert_eq!(blog.repos.comments.count_by_post(anns_post.id).await.unwrap(), 0);
    assert!(
        blog.repos
            .comments
            .find_by_id(anns_comment.id)
            .await
            .unwrap()
            .is_none()
    );
    let detail = blog.service.post_detail(bobs_post.id, None).await.unwrap();
    assert!(detail.comments.is_empty());
}

#[tokio::test]
async fn test_deleting_category_and_location_keeps_posts() {
    let blog = Blog::new();
    let (ann, _) = blog.user("ann").await;
    let category = blog.category("travel", true).await;
    let location = blog
        .repos
        .locations
        .insert(Location::new("Lisbon".into()))
        .await
        .unwrap();
    let post = blog
        .post(
            post_by(&ann, "Trip", -1)
                .with_category(category.id)
                .with_location(location.id),
        )
        .await;

    blog.repos.categories.delete(category.id).await.unwrap();
    blog.repos.locations.delete(location.id).await.unwrap();

    let stored = blog.repos.posts.find_by_id(post.id).await.unwrap().unwrap();
    assert_eq!(stored.category_id, None);
    assert_eq!(stored.location_id, None);

    let index = blog.service.index(PageRequest::default()).await.unwrap();
    assert_eq!(index.items.len(), 1);
}

#[tokio::test]
async fn test_edit_profile() {
    let blog = Blog::new();
    let (_, ann_viewer) = blog.user("ann").await;
    blog.user("bob").await;

    let form = blog.service.edit_profile_form(&ann_viewer).await.unwrap();
    assert_eq!(form.data.username, "ann");

    let taken = ProfileForm {
        username: "bob".into(),
        ..form.data.clone()
    };
    let outcome = blog.service.edit_profile(&ann_viewer, taken).await.unwrap();
    let Outcome::Render(state) = outcome else {
        panic!("expected the form to be re-rendered");
    };
    assert!(!state.errors.field("username").is_empty());

    let renamed = ProfileForm {
        username: "annie".into(),
        first_name: "Ann".into(),
        ..form.data
    };
    let outcome = blog.service.edit_profile(&ann_viewer, renamed).await.unwrap();
    assert_eq!(outcome, Outcome::Redirect(Redirect::Profile("annie".into())));

    let profile = blog
        .service
        .profile("annie", None, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(profile.profile.first_name, "Ann");
}

#[tokio::test]
async fn test_unknown_profile_is_not_found() {
    let blog = Blog::new();
    let result = blog
        .service
        .profile("nobody", None, PageRequest::default())
        .await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}
