//! Conversions from service page contexts to wire DTOs.

use quill_core::domain::{Category, Location, User};
use quill_core::forms::FormState;
use quill_core::pagination::Page;
use quill_core::service::{CommentCard, PostCard};
use quill_shared::dto::{
    AuthorResponse, CategoryResponse, CommentResponse, FieldErrors, FormResponse,
    LocationResponse, PageResponse, PostResponse, ProfileResponse,
};

pub fn form<F>(state: FormState<F>) -> FormResponse<F> {
    let errors: FieldErrors = state
        .errors
        .iter()
        .map(|(field, messages)| (field.to_string(), messages.to_vec()))
        .collect();
    FormResponse {
        data: state.data,
        errors,
    }
}

pub fn author(user: &User) -> AuthorResponse {
    AuthorResponse {
        id: user.id.to_string(),
        username: user.username.clone(),
        display_name: user.display_name(),
    }
}

pub fn profile(user: &User) -> ProfileResponse {
    ProfileResponse {
        id: user.id.to_string(),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        date_joined: user.created_at.to_rfc3339(),
    }
}

pub fn category(category: &Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id.to_string(),
        title: category.title.clone(),
        description: category.description.clone(),
        slug: category.slug.clone(),
    }
}

fn location(location: &Location) -> LocationResponse {
    LocationResponse {
        id: location.id.to_string(),
        name: location.name.clone(),
    }
}

pub fn post(card: &PostCard) -> PostResponse {
    let post = &card.post;
    PostResponse {
        id: post.id.to_string(),
        title: post.title.clone(),
        text: post.text.clone(),
        image: post.image.clone(),
        pub_date: post.pub_date.to_rfc3339(),
        is_published: post.is_published,
        created_at: post.created_at.to_rfc3339(),
        author: author(&card.author),
        category: card.category.as_ref().map(category),
        location: card.visible_location().map(location),
        comment_count: card.comment_count,
    }
}

pub fn comment(card: &CommentCard) -> CommentResponse {
    CommentResponse {
        id: card.comment.id.to_string(),
        post_id: card.comment.post_id.to_string(),
        text: card.comment.text.clone(),
        created_at: card.comment.created_at.to_rfc3339(),
        author: author(&card.author),
    }
}

pub fn posts(page: &Page<PostCard>) -> PageResponse<PostResponse> {
    PageResponse {
        items: page.items.iter().map(post).collect(),
        number: page.number,
        per_page: page.per_page,
        total_items: page.total_items,
        total_pages: page.total_pages,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
    }
}
