//! Tag service rules: the attach cap, row creation beyond the cap,
//! uniqueness on create/rename.

mod support;

use anyhow::Result;

use aperture_core::tags::{MAX_TAGS_PER_IMAGE, MAX_TAG_LEN};
use aperture_core::{NotFound, TagError, TagService, ValidationError};
use support::MemoryStore;

fn raw(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn attaches_up_to_the_cap_and_reports_the_rest() -> Result<()> {
    let store = MemoryStore::new();
    let service = TagService::new(store.clone());

    let attachment = service
        .attach_tags(&raw(&["a,b,c", "d,e,f,g"]))
        .await?;

    assert_eq!(attachment.tags.len(), MAX_TAGS_PER_IMAGE);
    let names: Vec<&str> = attachment.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c", "d", "e"]);
    assert_eq!(attachment.dropped, 2);
    assert!(attachment.warning.is_some());

    // The overflow tags still exist as rows, just unassociated.
    assert_eq!(store.tag_count(), 7);
    assert!(service.find_by_name("g").await.is_ok());
    Ok(())
}

#[tokio::test]
async fn attachment_under_the_cap_carries_no_warning() -> Result<()> {
    let store = MemoryStore::new();
    let service = TagService::new(store.clone());

    let attachment = service.attach_tags(&raw(&["sunset, beach"])).await?;
    assert_eq!(attachment.tags.len(), 2);
    assert_eq!(attachment.dropped, 0);
    assert_eq!(attachment.warning, None);
    Ok(())
}

#[tokio::test]
async fn attachment_reuses_existing_rows() -> Result<()> {
    let store = MemoryStore::new();
    let service = TagService::new(store.clone());

    let first = service.attach_tags(&raw(&["sunset"])).await?;
    let second = service.attach_tags(&raw(&["Sunset, beach"])).await?;

    assert_eq!(second.tags[0].id, first.tags[0].id);
    assert_eq!(store.tag_count(), 2);
    Ok(())
}

#[tokio::test]
async fn long_names_are_truncated_before_storage() -> Result<()> {
    let store = MemoryStore::new();
    let service = TagService::new(store.clone());

    let long = "x".repeat(30);
    let attachment = service.attach_tags(&[long]).await?;
    assert_eq!(attachment.tags.len(), 1);
    assert_eq!(attachment.tags[0].name.len(), MAX_TAG_LEN);
    Ok(())
}

#[tokio::test]
async fn create_rejects_duplicates_case_insensitively() -> Result<()> {
    let store = MemoryStore::new();
    let service = TagService::new(store.clone());

    let tag = service.create_tag("Sunset").await?;
    assert_eq!(tag.name, "sunset");

    let duplicate = service.create_tag("SUNSET").await;
    assert!(matches!(
        duplicate,
        Err(TagError::Validation(ValidationError::TagNameTaken))
    ));
    Ok(())
}

#[tokio::test]
async fn rename_refuses_a_taken_name_but_allows_case_fixes() -> Result<()> {
    let store = MemoryStore::new();
    let service = TagService::new(store.clone());

    let sunset = service.create_tag("sunset").await?;
    service.create_tag("beach").await?;

    let collision = service.update_tag(sunset.id, "beach").await;
    assert!(matches!(
        collision,
        Err(TagError::Validation(ValidationError::TagNameTaken))
    ));

    // Renaming to its own normalized form is a no-op success.
    let kept = service.update_tag(sunset.id, "Sunset").await?;
    assert_eq!(kept.name, "sunset");
    Ok(())
}

#[tokio::test]
async fn list_paginates_in_insertion_order() -> Result<()> {
    let store = MemoryStore::new();
    let service = TagService::new(store.clone());

    for name in ["a", "b", "c", "d"] {
        service.create_tag(name).await?;
    }

    let page = service.list(1, 2).await?;
    let names: Vec<&str> = page.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["b", "c"]);
    Ok(())
}

#[tokio::test]
async fn missing_tags_surface_as_not_found() -> Result<()> {
    let store = MemoryStore::new();
    let service = TagService::new(store.clone());

    assert!(matches!(
        service.find_by_name("ghost").await,
        Err(TagError::NotFound(NotFound::Tag))
    ));
    assert!(matches!(
        service.remove_tag(uuid::Uuid::new_v4()).await,
        Err(TagError::NotFound(NotFound::Tag))
    ));
    Ok(())
}
