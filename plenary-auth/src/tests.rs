// SPDX-License-Identifier: MIT OR Apache-2.0

use plenary_core::{AttendanceKey, EventId, RoleTitle, TrackId, UserId};
use plenary_store::MemoryStore;

use crate::attendance::{AttendanceError, AttendanceQuery, AttendanceService};
use crate::change::AttendanceChange;
use crate::invitation::{InvitationError, InvitationService};

const EVENT: i64 = 10;
const TRACK: i64 = 51;

/// Enable log output for a run with `RUST_LOG=debug cargo test`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn user(id: i64) -> UserId {
    UserId::new(id)
}

fn event() -> EventId {
    EventId::new(EVENT)
}

fn track() -> TrackId {
    TrackId::new(TRACK)
}

fn key(user_id: i64, track: Option<TrackId>) -> AttendanceKey {
    AttendanceKey::new(user(user_id), event(), track)
}

/// A service over a shared in-memory store, seeded with confirmed role
/// holders: (user id, track scope, role).
async fn seeded(
    holders: &[(i64, Option<TrackId>, RoleTitle)],
) -> InvitationService<MemoryStore> {
    let mut attendances = AttendanceService::new(MemoryStore::new());
    for (id, scope, role) in holders {
        attendances
            .create(user(*id), event(), *scope, *role)
            .await
            .unwrap();
        attendances.confirm(&key(*id, *scope)).await.unwrap();
    }
    InvitationService::new(attendances)
}

#[tokio::test]
async fn creating_twice_for_one_identity_fails() {
    init_tracing();
    let mut attendances = AttendanceService::new(MemoryStore::new());

    let change = attendances
        .create(user(5), event(), None, RoleTitle::Attendee)
        .await
        .unwrap();
    assert!(matches!(change, AttendanceChange::Created(_)));
    assert!(!change.attendee().confirmed());

    let err = attendances
        .create(user(5), event(), None, RoleTitle::Attendee)
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::AlreadyExists(_)));

    assert!(attendances.get(&key(5, None)).await.is_ok());
}

#[tokio::test]
async fn event_and_track_attendances_are_independent_identities() {
    let mut attendances = AttendanceService::new(MemoryStore::new());

    attendances
        .create(user(5), event(), None, RoleTitle::Attendee)
        .await
        .unwrap();
    attendances
        .create(user(5), event(), Some(track()), RoleTitle::Author)
        .await
        .unwrap();

    let event_level = attendances.get(&key(5, None)).await.unwrap();
    let track_level = attendances.get(&key(5, Some(track()))).await.unwrap();
    assert_eq!(event_level.role(), RoleTitle::Attendee);
    assert_eq!(track_level.role(), RoleTitle::Author);
}

#[tokio::test]
async fn confirmation_is_idempotent_and_removal_terminal() {
    let mut attendances = AttendanceService::new(MemoryStore::new());

    attendances
        .create(user(5), event(), None, RoleTitle::Attendee)
        .await
        .unwrap();

    let err = attendances.get_confirmed(&key(5, None)).await.unwrap_err();
    assert!(matches!(err, AttendanceError::Unconfirmed(_)));

    attendances.confirm(&key(5, None)).await.unwrap();
    let again = attendances.confirm(&key(5, None)).await.unwrap();
    assert!(again.attendee().confirmed());

    let removed = attendances.remove(&key(5, None)).await.unwrap();
    assert!(matches!(removed, AttendanceChange::Removed(_)));

    let err = attendances.get(&key(5, None)).await.unwrap_err();
    assert!(matches!(
        err,
        AttendanceError::NotFound(AttendanceQuery::Key(_))
    ));
}

#[tokio::test]
async fn role_changes_report_the_previous_role() {
    let mut attendances = AttendanceService::new(MemoryStore::new());

    attendances
        .create(user(5), event(), None, RoleTitle::SubReviewer)
        .await
        .unwrap();
    let change = attendances
        .change_role(&key(5, None), RoleTitle::PcMember)
        .await
        .unwrap();

    match change {
        AttendanceChange::RoleChanged { previous, current } => {
            assert_eq!(previous, RoleTitle::SubReviewer);
            assert_eq!(current.role(), RoleTitle::PcMember);
        }
        other => panic!("expected role change, got {other:?}"),
    }
}

#[tokio::test]
async fn listings_contain_only_confirmed_records() {
    let mut attendances = AttendanceService::new(MemoryStore::new());

    attendances
        .create(user(1), event(), None, RoleTitle::PcChair)
        .await
        .unwrap();
    attendances.confirm(&key(1, None)).await.unwrap();
    attendances
        .create(user(2), event(), None, RoleTitle::Author)
        .await
        .unwrap();

    let listed = attendances.list_by_event(event()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].key().user(), user(1));

    let pending = attendances.pending_by_user(user(2)).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert!(!pending[0].confirmed());

    // Empty results surface as NotFound rather than an empty list.
    let err = attendances.list_by_track(track()).await.unwrap_err();
    assert!(matches!(
        err,
        AttendanceError::NotFound(AttendanceQuery::Track(_))
    ));
}

#[tokio::test]
async fn chair_invites_author_into_a_track() {
    init_tracing();
    let mut invitations = seeded(&[(1, Some(track()), RoleTitle::PcChair)]).await;

    let change = invitations
        .invite(user(1), user(2), event(), Some(track()), RoleTitle::Author)
        .await
        .unwrap();
    assert!(!change.attendee().confirmed());

    // Accepting is the invited user's move; a bystander cannot.
    let err = invitations
        .accept(user(3), &key(2, Some(track())))
        .await
        .unwrap_err();
    assert!(matches!(err, InvitationError::ExecutorNotAttending(_)));

    invitations
        .accept(user(2), &key(2, Some(track())))
        .await
        .unwrap();
    let confirmed = invitations
        .attendances()
        .get_confirmed(&key(2, Some(track())))
        .await
        .unwrap();
    assert!(confirmed.confirmed());
}

#[tokio::test]
async fn attendees_cannot_grant_chair_roles() {
    let mut invitations = seeded(&[(2, None, RoleTitle::Attendee)]).await;

    let err = invitations
        .invite(user(2), user(3), event(), None, RoleTitle::PcChair)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InvitationError::InsufficientPermission {
            target: RoleTitle::PcChair,
            ..
        }
    ));
}

#[tokio::test]
async fn invitations_require_a_confirmed_executor_in_scope() {
    let mut invitations = seeded(&[]).await;

    // Not attending at all.
    let err = invitations
        .invite(user(1), user(2), event(), None, RoleTitle::Attendee)
        .await
        .unwrap_err();
    assert!(matches!(err, InvitationError::ExecutorNotAttending(_)));

    // Holding only a pending invitation is not enough.
    invitations
        .enroll(user(1), event(), None, RoleTitle::PcChair)
        .await
        .unwrap();
    let err = invitations
        .invite(user(1), user(2), event(), None, RoleTitle::Attendee)
        .await
        .unwrap_err();
    assert!(matches!(err, InvitationError::ExecutorNotAttending(_)));

    // An event-level chair is out of scope for a track-level invite.
    let mut invitations = seeded(&[(1, None, RoleTitle::PcChair)]).await;
    let err = invitations
        .invite(user(1), user(2), event(), Some(track()), RoleTitle::Author)
        .await
        .unwrap_err();
    assert!(matches!(err, InvitationError::ExecutorNotAttending(_)));
}

#[tokio::test]
async fn permission_is_monotonic_in_target_precedence() {
    use plenary_core::role::{permits, precedence_of, permission_of};

    let granted = [
        RoleTitle::SubReviewer,
        RoleTitle::Author,
        RoleTitle::Attendee,
    ];
    let denied = [
        RoleTitle::GeneralChair,
        RoleTitle::PcChair,
        RoleTitle::PcMember,
    ];

    for role in granted {
        assert!(permits(RoleTitle::PcMember, role));
        assert!(permission_of(RoleTitle::PcMember) <= precedence_of(role));
    }
    for role in denied {
        assert!(!permits(RoleTitle::PcMember, role));
    }

    let mut invitations = seeded(&[(1, None, RoleTitle::PcMember)]).await;
    for (target, role) in granted.iter().enumerate() {
        invitations
            .invite(user(1), user(target as i64 + 10), event(), None, *role)
            .await
            .unwrap();
    }
    for (target, role) in denied.iter().enumerate() {
        let err = invitations
            .invite(user(1), user(target as i64 + 20), event(), None, *role)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InvitationError::InsufficientPermission { .. }
        ));
    }
}

#[tokio::test]
async fn chairs_may_preconfirm_and_revoke_their_delegates() {
    let mut invitations = seeded(&[(1, Some(track()), RoleTitle::PcChair)]).await;

    invitations
        .invite(user(1), user(2), event(), Some(track()), RoleTitle::Author)
        .await
        .unwrap();

    // Pre-confirmation by the inviting chair.
    invitations
        .accept(user(1), &key(2, Some(track())))
        .await
        .unwrap();

    // Revocation of the now confirmed attendance.
    let removed = invitations
        .remove(user(1), &key(2, Some(track())))
        .await
        .unwrap();
    assert!(matches!(removed, AttendanceChange::Removed(_)));

    let err = invitations
        .attendances()
        .get(&key(2, Some(track())))
        .await
        .unwrap_err();
    assert!(matches!(err, AttendanceError::NotFound(_)));
}

#[tokio::test]
async fn rejection_only_applies_to_pending_invitations() {
    let mut invitations = seeded(&[(1, None, RoleTitle::GeneralChair)]).await;

    invitations
        .invite(user(1), user(2), event(), None, RoleTitle::Author)
        .await
        .unwrap();

    // A bystander cannot reject someone else's invitation.
    let err = invitations.reject(user(3), &key(2, None)).await.unwrap_err();
    assert!(matches!(err, InvitationError::ExecutorNotAttending(_)));

    // Self-rejection of a pending invitation.
    invitations.reject(user(2), &key(2, None)).await.unwrap();
    assert!(matches!(
        invitations.attendances().get(&key(2, None)).await,
        Err(AttendanceError::NotFound(_))
    ));

    // Once confirmed, the record can only be removed, not rejected.
    invitations
        .invite(user(1), user(2), event(), None, RoleTitle::Author)
        .await
        .unwrap();
    invitations.accept(user(2), &key(2, None)).await.unwrap();
    let err = invitations.reject(user(1), &key(2, None)).await.unwrap_err();
    assert!(matches!(err, InvitationError::NotPending(_)));
}

#[tokio::test]
async fn anyone_may_resign_their_own_attendance() {
    let mut invitations = seeded(&[(2, None, RoleTitle::Attendee)]).await;

    // Leaving is not a permissioned operation; no executor attendance is
    // resolved at all.
    invitations.resign(user(2), event(), None).await.unwrap();
    assert!(matches!(
        invitations.attendances().get(&key(2, None)).await,
        Err(AttendanceError::NotFound(_))
    ));

    // Resigning a pending invitation works the same way.
    invitations
        .enroll(user(3), event(), None, RoleTitle::Attendee)
        .await
        .unwrap();
    invitations.resign(user(3), event(), None).await.unwrap();
}

#[tokio::test]
async fn enrollment_bypasses_the_permission_comparison() {
    let mut invitations = seeded(&[]).await;

    let change = invitations
        .enroll(user(7), event(), None, RoleTitle::Attendee)
        .await
        .unwrap();
    assert!(!change.attendee().confirmed());

    // The identity invariant still holds on the self-service path.
    let err = invitations
        .enroll(user(7), event(), None, RoleTitle::Attendee)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InvitationError::Attendance(AttendanceError::AlreadyExists(_))
    ));
}

#[tokio::test]
async fn failed_invitations_leave_the_store_unchanged() {
    let mut invitations = seeded(&[(2, None, RoleTitle::Attendee)]).await;

    invitations
        .invite(user(2), user(3), event(), None, RoleTitle::PcChair)
        .await
        .unwrap_err();

    // No record was created for the target and the scope still holds only
    // the seeded attendee.
    assert!(matches!(
        invitations.attendances().get(&key(3, None)).await,
        Err(AttendanceError::NotFound(_))
    ));
    let listed = invitations.attendances().list_by_event(event()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].key().user(), user(2));
}
