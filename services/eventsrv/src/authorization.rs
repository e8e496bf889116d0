//! Authorization gate for user-initiated events

use crate::event::UserId;
use crate::resolver::RecipientSet;

/// An actor may arm or disarm an alarm only if it is one of its recipients.
///
/// Pure membership test; never fails.
pub fn authorize(actor: UserId, recipients: &RecipientSet) -> bool {
    recipients.contains(actor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_is_authorized() {
        let recipients: RecipientSet = [UserId(7), UserId(9)].into_iter().collect();
        assert!(authorize(UserId(9), &recipients));
        assert!(!authorize(UserId(3), &recipients));
    }

    #[test]
    fn test_empty_set_authorizes_nobody() {
        assert!(!authorize(UserId(7), &RecipientSet::default()));
    }

    #[test]
    fn test_order_does_not_matter() {
        let forward: RecipientSet = [UserId(7), UserId(9)].into_iter().collect();
        let reverse: RecipientSet = [UserId(9), UserId(7)].into_iter().collect();
        for user in [UserId(3), UserId(7), UserId(9)] {
            assert_eq!(authorize(user, &forward), authorize(user, &reverse));
        }
    }
}
