use crate::store::{ChallengeKind, ChallengeParty, ChallengeRecord};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeSummary {
    pub id: i64,
    pub title: String,
    pub days_left: i64,
    pub participants: u8,
    pub opponent_name: Option<String>,
    pub opponent_avatar: Option<String>,
}

pub fn challenge_summaries(
    user_id: i64,
    challenges: &[ChallengeRecord],
    now: DateTime<Utc>,
) -> Vec<ChallengeSummary> {
    challenges
        .iter()
        .map(|challenge| summarize(user_id, challenge, now))
        .collect()
}

fn summarize(user_id: i64, challenge: &ChallengeRecord, now: DateTime<Utc>) -> ChallengeSummary {
    let rival = match challenge.kind {
        // Whichever of the two parties is not the requesting user.
        ChallengeKind::Friend => {
            if challenge.owner.user_id != user_id {
                Some(&challenge.owner)
            } else {
                challenge.opponent.as_ref()
            }
        }
        ChallengeKind::Personal => None,
    };

    ChallengeSummary {
        id: challenge.id,
        title: challenge.title.clone(),
        days_left: challenge
            .end_date
            .map(|end| days_until(now, end))
            .unwrap_or(0),
        participants: if challenge.opponent.is_some() { 2 } else { 1 },
        opponent_name: rival.and_then(|party: &ChallengeParty| party.display_name.clone()),
        opponent_avatar: rival.and_then(|party| party.avatar_url.clone()),
    }
}

// Whole days remaining; any remainder, however small, counts as one more
// day. An end date at or before `now` counts as 0.
fn days_until(now: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    if end <= now {
        return 0;
    }

    let remaining = end - now;
    let whole_days = remaining.num_days();
    if remaining > Duration::days(whole_days) {
        whole_days + 1
    } else {
        whole_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn timestamp(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn party(user_id: i64, name: Option<&str>, avatar: Option<&str>) -> ChallengeParty {
        ChallengeParty {
            user_id,
            display_name: name.map(ToOwned::to_owned),
            avatar_url: avatar.map(ToOwned::to_owned),
        }
    }

    fn friend_challenge(end_date: Option<DateTime<Utc>>) -> ChallengeRecord {
        ChallengeRecord {
            id: 10,
            title: "30 días corriendo".to_string(),
            kind: ChallengeKind::Friend,
            owner: party(1, Some("Ana"), None),
            opponent: Some(party(2, Some("Luis"), Some("https://cdn.example/luis.png"))),
            end_date,
        }
    }

    #[test]
    fn owner_sees_the_opponent_party() {
        let now = timestamp("2024-11-15T12:00:00Z");
        let challenge = friend_challenge(Some(now + Duration::days(10)));

        let summary = &challenge_summaries(1, &[challenge], now)[0];

        assert_eq!(summary.days_left, 10);
        assert_eq!(summary.participants, 2);
        assert_eq!(summary.opponent_name.as_deref(), Some("Luis"));
        assert_eq!(
            summary.opponent_avatar.as_deref(),
            Some("https://cdn.example/luis.png")
        );
    }

    #[test]
    fn opponent_sees_the_owner_party() {
        let now = timestamp("2024-11-15T12:00:00Z");
        let challenge = friend_challenge(None);

        let summary = &challenge_summaries(2, &[challenge], now)[0];

        assert_eq!(summary.opponent_name.as_deref(), Some("Ana"));
        assert_eq!(summary.opponent_avatar, None, "Ana has no avatar set");
    }

    #[test]
    fn partial_days_round_up() {
        let now = timestamp("2024-11-15T12:00:00Z");
        let summaries = challenge_summaries(
            1,
            &[
                friend_challenge(Some(now + Duration::milliseconds(500))),
                friend_challenge(Some(now + Duration::hours(1))),
                friend_challenge(Some(now + Duration::days(2) + Duration::milliseconds(1))),
                friend_challenge(Some(now + Duration::days(3) - Duration::seconds(1))),
            ],
            now,
        );

        assert_eq!(summaries[0].days_left, 1, "sub-second remainders still count");
        assert_eq!(summaries[1].days_left, 1);
        assert_eq!(summaries[2].days_left, 3);
        assert_eq!(summaries[3].days_left, 3);
    }

    #[test]
    fn past_or_absent_end_dates_leave_no_days() {
        let now = timestamp("2024-11-15T12:00:00Z");
        let summaries = challenge_summaries(
            1,
            &[
                friend_challenge(Some(now - Duration::days(2))),
                friend_challenge(Some(now)),
                friend_challenge(None),
            ],
            now,
        );

        assert!(summaries.iter().all(|summary| summary.days_left == 0));
    }

    #[test]
    fn personal_challenges_never_expose_a_rival() {
        let now = timestamp("2024-11-15T12:00:00Z");
        let challenge = ChallengeRecord {
            id: 11,
            title: "Meditar a diario".to_string(),
            kind: ChallengeKind::Personal,
            owner: party(1, Some("Ana"), None),
            opponent: Some(party(2, Some("Luis"), None)),
            end_date: None,
        };

        let summary = &challenge_summaries(1, &[challenge], now)[0];

        assert_eq!(summary.participants, 2, "participant count ignores kind");
        assert_eq!(summary.opponent_name, None);
        assert_eq!(summary.opponent_avatar, None);
    }

    #[test]
    fn missing_opponent_profile_yields_empty_fields() {
        let now = timestamp("2024-11-15T12:00:00Z");
        let mut challenge = friend_challenge(None);
        challenge.opponent = Some(party(2, None, None));

        let summary = &challenge_summaries(1, &[challenge], now)[0];

        assert_eq!(summary.participants, 2);
        assert_eq!(summary.opponent_name, None);
        assert_eq!(summary.opponent_avatar, None);
    }
}
