//! Integration tests for the support graph and profile aggregation

mod common;

use std::sync::Arc;

use circle_core::AuthError;
use common::Fixture;

#[tokio::test]
async fn support_is_idempotent_and_counts_once() {
    let fx = Fixture::new();
    let u1 = fx.user("u1").await;
    let u2 = fx.user("u2").await;

    assert!(fx.service.support(u1, u2).await.unwrap());
    assert!(!fx.service.support(u1, u2).await.unwrap());

    let view = fx.service.profile_view(u2, None).await.unwrap();
    assert_eq!(view.supporters_count, 1);
    assert_eq!(view.supporting_count, 0);
}

#[tokio::test]
async fn unsupport_of_absent_edge_returns_false() {
    let fx = Fixture::new();
    let u1 = fx.user("u1").await;
    let u2 = fx.user("u2").await;

    assert!(!fx.service.unsupport(u1, u2).await.unwrap());
    assert!(fx.service.support(u1, u2).await.unwrap());
    assert!(fx.service.unsupport(u1, u2).await.unwrap());
    assert!(!fx.service.unsupport(u1, u2).await.unwrap());
}

#[tokio::test]
async fn is_supporter_tracks_viewer() {
    let fx = Fixture::new();
    let u1 = fx.user("u1").await;
    let u2 = fx.user("u2").await;

    assert!(!fx.service.profile_view(u2, Some(u1)).await.unwrap().is_supporter);

    fx.service.support(u1, u2).await.unwrap();
    assert!(fx.service.profile_view(u2, Some(u1)).await.unwrap().is_supporter);
    assert!(fx.service.is_supporting(u1, u2).await.unwrap());

    // Anonymous viewers and the reverse direction never see the flag
    assert!(!fx.service.profile_view(u2, None).await.unwrap().is_supporter);
    assert!(!fx.service.profile_view(u1, Some(u2)).await.unwrap().is_supporter);

    fx.service.unsupport(u1, u2).await.unwrap();
    assert!(!fx.service.profile_view(u2, Some(u1)).await.unwrap().is_supporter);
}

#[tokio::test]
async fn counts_belong_to_the_viewed_user() {
    let fx = Fixture::new();
    let u1 = fx.user("u1").await;
    let u2 = fx.user("u2").await;
    let u3 = fx.user("u3").await;

    // U1 -> U2, U3 -> U2, U2 -> U1
    fx.service.support(u1, u2).await.unwrap();
    fx.service.support(u3, u2).await.unwrap();
    fx.service.support(u2, u1).await.unwrap();

    let view = fx.service.profile_view(u2, Some(u1)).await.unwrap();
    assert_eq!(view.username, "u2");
    assert_eq!(view.supporters_count, 2);
    assert_eq!(view.supporting_count, 1);
    assert!(view.is_supporter);

    let view = fx.service.profile_view(u1, Some(u3)).await.unwrap();
    assert_eq!(view.supporters_count, 1);
    assert_eq!(view.supporting_count, 1);
    assert!(!view.is_supporter);

    let view = fx.service.profile_view(u3, Some(u2)).await.unwrap();
    assert_eq!(view.supporters_count, 0);
    assert_eq!(view.supporting_count, 1);
    assert!(!view.is_supporter);
}

#[tokio::test]
async fn profile_by_username_is_case_insensitive() {
    let fx = Fixture::new();
    let u1 = fx.user("u1").await;
    let u2 = fx.user("u2").await;
    fx.service.support_by_username(u1, "U2").await.unwrap();

    let view = fx.service.profile_by_username("  U2 ", Some(u1)).await.unwrap();
    assert_eq!(view.user_id, u2);
    assert!(view.is_supporter);

    assert!(fx.service.unsupport_by_username(u1, "u2").await.unwrap());
}

#[tokio::test]
async fn unknown_targets_are_not_found() {
    let fx = Fixture::new();
    let u1 = fx.user("u1").await;

    assert!(matches!(
        fx.service.profile_by_username("ghost", Some(u1)).await,
        Err(AuthError::NotFound)
    ));
    assert!(matches!(
        fx.service.profile_by_username("", None).await,
        Err(AuthError::NotFound)
    ));
    assert!(matches!(
        fx.service.profile_view(circle_types::UserId::new(), None).await,
        Err(AuthError::NotFound)
    ));
    assert!(matches!(
        fx.service.support(u1, circle_types::UserId::new()).await,
        Err(AuthError::NotFound)
    ));
}

#[tokio::test]
async fn self_support_is_rejected() {
    let fx = Fixture::new();
    let u1 = fx.user("u1").await;

    assert!(matches!(
        fx.service.support(u1, u1).await,
        Err(AuthError::SelfSupport)
    ));
    let view = fx.service.profile_view(u1, Some(u1)).await.unwrap();
    assert_eq!(view.supporters_count, 0);
    assert!(!view.is_supporter);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_supports_create_one_edge() {
    let fx = Arc::new(Fixture::new());
    let u1 = fx.user("u1").await;
    let u2 = fx.user("u2").await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let fx = Arc::clone(&fx);
        handles.push(tokio::spawn(async move { fx.service.support(u1, u2).await }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(
        fx.service.profile_view(u2, None).await.unwrap().supporters_count,
        1
    );
}
