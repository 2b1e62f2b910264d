//! Enemy roster pipeline: enrichment, targeting priority, manual sort
//! columns, filters, and pinning.
//!
//! The display order is produced in three stages. First each member is
//! joined with its stat estimate and pin flag. Then the active filters
//! drop rows. Finally the rows are sorted by the active column (or the
//! default targeting priority) and pinned rows are floated to the top
//! with a stable partition.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{FfScouterData, Member, MemberState, OnlineStatus};

/// A roster member joined with its stat estimate and pin state.
#[derive(Debug, Clone)]
pub struct EnemyMember {
    pub id: i64,
    pub member: Member,
    pub ffs: Option<FfScouterData>,
    pub pinned: bool,
}

impl EnemyMember {
    pub fn fair_fight(&self) -> Option<f64> {
        self.ffs.as_ref().and_then(|f| f.fair_fight)
    }

    pub fn bs_estimate(&self) -> Option<i64> {
        self.ffs.as_ref().and_then(|f| f.bs_estimate)
    }
}

/// Join members with stat estimates by player id. A member carries an
/// estimate only when the stat service returned a record for its id.
pub fn enrich(
    members: Vec<(i64, Member)>,
    stats: &HashMap<i64, FfScouterData>,
    pinned: &HashSet<i64>,
) -> Vec<EnemyMember> {
    members
        .into_iter()
        .map(|(id, member)| EnemyMember {
            id,
            member,
            ffs: stats.get(&id).cloned(),
            pinned: pinned.contains(&id),
        })
        .collect()
}

/// Targeting priority for the default ordering. Lower is more
/// attackable right now.
///
/// 1. Okay, online, and in the same location as the user
/// 2. Okay
/// 3. Hospital (tiebroken by release time elsewhere)
/// 4. Traveling back to Torn
/// 5. Traveling away
/// 6. Abroad
/// 99. anything else
pub fn priority(member: &Member, user_location: Option<&str>) -> u8 {
    match member.status.state {
        MemberState::Okay => {
            if member.last_action.status == OnlineStatus::Online
                && user_location.is_some()
                && user_location == Some(member.status.description.as_str())
            {
                1
            } else {
                2
            }
        }
        MemberState::Hospital => 3,
        MemberState::Traveling => match &member.status.travel_type {
            Some(travel_type) => {
                let travel_type = travel_type.to_lowercase();
                if travel_type.contains("return") || travel_type.contains("back") {
                    4
                } else {
                    5
                }
            }
            None => 99,
        },
        MemberState::Abroad => 6,
        _ => 99,
    }
}

// ===== Sort columns =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    /// Default targeting order. Always ascending.
    Priority,
    Online,
    Name,
    Level,
    Status,
    FairFight,
    BattleStats,
    LastAction,
}

impl SortColumn {
    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Priority => "Priority",
            SortColumn::Online => "Online",
            SortColumn::Name => "Name",
            SortColumn::Level => "Level",
            SortColumn::Status => "Status",
            SortColumn::FairFight => "FF",
            SortColumn::BattleStats => "Battle Stats",
            SortColumn::LastAction => "Last Action",
        }
    }

    /// Ascending comparison for this column between two rows.
    fn compare(
        &self,
        a: &EnemyMember,
        b: &EnemyMember,
        user_location: Option<&str>,
    ) -> Ordering {
        match self {
            SortColumn::Priority => {
                let pa = priority(&a.member, user_location);
                let pb = priority(&b.member, user_location);
                pa.cmp(&pb).then_with(|| hospital_tiebreak(a, b))
            }
            SortColumn::Online => a
                .member
                .last_action
                .status
                .sort_order()
                .cmp(&b.member.last_action.status.sort_order()),
            SortColumn::Name => crate::utils::cmp_ignore_case(&a.member.name, &b.member.name),
            SortColumn::Level => a.member.level.cmp(&b.member.level),
            SortColumn::Status => {
                let sa = a.member.status.state.sort_order();
                let sb = b.member.status.state.sort_order();
                sa.cmp(&sb).then_with(|| state_tiebreak(a, b))
            }
            SortColumn::FairFight => cmp_option_last(a.fair_fight(), b.fair_fight(), |x, y| {
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }),
            SortColumn::BattleStats => {
                cmp_option_last(a.bs_estimate(), b.bs_estimate(), |x, y| x.cmp(&y))
            }
            SortColumn::LastAction => a
                .member
                .last_action
                .timestamp
                .cmp(&b.member.last_action.timestamp),
        }
    }
}

/// Hospitalized pairs order by soonest release.
fn hospital_tiebreak(a: &EnemyMember, b: &EnemyMember) -> Ordering {
    if a.member.status.state == MemberState::Hospital
        && b.member.status.state == MemberState::Hospital
    {
        a.member.status.until.cmp(&b.member.status.until)
    } else {
        Ordering::Equal
    }
}

/// Status column tiebreaks: hospital by release time, traveling with
/// returners first.
fn state_tiebreak(a: &EnemyMember, b: &EnemyMember) -> Ordering {
    match (a.member.status.state, b.member.status.state) {
        (MemberState::Hospital, MemberState::Hospital) => {
            a.member.status.until.cmp(&b.member.status.until)
        }
        (MemberState::Traveling, MemberState::Traveling) => {
            match (a.member.status.is_returning(), b.member.status.is_returning()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => Ordering::Equal,
            }
        }
        _ => Ordering::Equal,
    }
}

/// Missing values always sort last, regardless of direction handling
/// applied afterwards by the caller.
fn cmp_option_last<T>(
    a: Option<T>,
    b: Option<T>,
    cmp: impl Fn(T, T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => cmp(x, y),
    }
}

// ===== Filters =====

/// Fair-fight buckets matching the display coloring thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FfBucket {
    Under2,
    Under4,
    Under6,
}

impl FfBucket {
    pub const ALL: [FfBucket; 3] = [FfBucket::Under2, FfBucket::Under4, FfBucket::Under6];

    pub fn label(&self) -> &'static str {
        match self {
            FfBucket::Under2 => "<2",
            FfBucket::Under4 => "<4",
            FfBucket::Under6 => "<6",
        }
    }

    fn matches(&self, ff: f64) -> bool {
        match self {
            FfBucket::Under2 => ff < 2.0,
            FfBucket::Under4 => ff < 4.0,
            FfBucket::Under6 => ff < 6.0,
        }
    }
}

/// Active roster filters. Within a group, selections are ORed; across
/// groups they are ANDed. An empty group passes everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub online_status: HashSet<OnlineStatus>,
    pub state: HashSet<MemberState>,
    pub ff: HashSet<FfBucket>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.online_status.is_empty() && self.state.is_empty() && self.ff.is_empty()
    }

    pub fn clear(&mut self) {
        self.online_status.clear();
        self.state.clear();
        self.ff.clear();
    }

    /// Count of active selections, for the status bar.
    pub fn active_count(&self) -> usize {
        self.online_status.len() + self.state.len() + self.ff.len()
    }

    pub fn matches(&self, row: &EnemyMember) -> bool {
        if !self.online_status.is_empty()
            && !self.online_status.contains(&row.member.last_action.status)
        {
            return false;
        }

        if !self.state.is_empty() && !self.state.contains(&row.member.status.state) {
            return false;
        }

        if !self.ff.is_empty() {
            // A bucket filter can only match a member with a known FF.
            match row.fair_fight() {
                Some(ff) => {
                    if !self.ff.iter().any(|bucket| bucket.matches(ff)) {
                        return false;
                    }
                }
                None => return false,
            }
        }

        true
    }
}

// ===== Pipeline =====

/// Produce the final display order: filter, sort by the active column
/// and direction, then float pinned rows to the top preserving their
/// relative order.
pub fn display_order(
    mut rows: Vec<EnemyMember>,
    filters: &FilterState,
    column: SortColumn,
    ascending: bool,
    user_location: Option<&str>,
) -> Vec<EnemyMember> {
    rows.retain(|row| filters.matches(row));

    rows.sort_by(|a, b| {
        let ord = column.compare(a, b, user_location);
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });

    let (pinned, rest): (Vec<_>, Vec<_>) = rows.into_iter().partition(|row| row.pinned);
    let mut ordered = pinned;
    ordered.extend(rest);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LastAction, Status};

    fn member(name: &str, state: &str, online: &str) -> Member {
        Member {
            name: name.to_string(),
            level: 50,
            days_in_faction: 100,
            position: "Member".to_string(),
            last_action: LastAction {
                status: OnlineStatus::from(online.to_string()),
                timestamp: 1_700_000_000,
                relative: "1 hour ago".to_string(),
            },
            status: Status {
                description: match state {
                    "Okay" => "Okay".to_string(),
                    "Hospital" => "In hospital for 2 mins".to_string(),
                    "Traveling" => "Traveling to Switzerland".to_string(),
                    "Abroad" => "In Switzerland".to_string(),
                    other => other.to_string(),
                },
                details: String::new(),
                state: MemberState::from(state.to_string()),
                color: "green".to_string(),
                until: 0,
                travel_type: None,
            },
        }
    }

    fn row(id: i64, member: Member) -> EnemyMember {
        EnemyMember { id, member, ffs: None, pinned: false }
    }

    fn with_ff(mut row: EnemyMember, ff: f64) -> EnemyMember {
        row.ffs = Some(FfScouterData {
            player_id: row.id,
            fair_fight: Some(ff),
            bs_estimate: Some((ff * 1_000_000.0) as i64),
            bs_estimate_human: Some("1m".to_string()),
            bss_public: None,
            last_updated: Some(1_700_000_000),
        });
        row
    }

    #[test]
    fn test_priority_ordering() {
        let mut okay_here = member("A", "Okay", "Online");
        okay_here.status.description = "Torn".to_string();
        let okay_elsewhere = member("B", "Okay", "Offline");
        let hospital = member("C", "Hospital", "Online");
        let abroad = member("D", "Abroad", "Online");

        let loc = Some("Torn");
        assert_eq!(priority(&okay_here, loc), 1);
        assert_eq!(priority(&okay_elsewhere, loc), 2);
        assert_eq!(priority(&hospital, loc), 3);
        assert_eq!(priority(&abroad, loc), 6);

        // Without a known user location nobody gets priority 1
        assert_eq!(priority(&okay_here, None), 2);
    }

    #[test]
    fn test_priority_traveling() {
        let mut returning = member("A", "Traveling", "Online");
        returning.status.travel_type = Some("Returning".to_string());
        let mut away = member("B", "Traveling", "Online");
        away.status.travel_type = Some("Standard".to_string());
        let unknown_leg = member("C", "Traveling", "Online");

        assert_eq!(priority(&returning, None), 4);
        assert_eq!(priority(&away, None), 5);
        assert_eq!(priority(&unknown_leg, None), 99);
    }

    #[test]
    fn test_hospital_tiebreak_soonest_out_first() {
        let mut early = row(1, member("Early", "Hospital", "Online"));
        early.member.status.until = 100;
        let mut late = row(2, member("Late", "Hospital", "Online"));
        late.member.status.until = 200;

        let ordered = display_order(
            vec![late, early],
            &FilterState::default(),
            SortColumn::Priority,
            true,
            None,
        );
        assert_eq!(ordered[0].member.name, "Early");
        assert_eq!(ordered[1].member.name, "Late");
    }

    #[test]
    fn test_missing_stats_sort_last_both_directions() {
        let a = with_ff(row(1, member("A", "Okay", "Online")), 1.5);
        let b = with_ff(row(2, member("B", "Okay", "Online")), 3.0);
        let c = row(3, member("C", "Okay", "Online"));

        let asc = display_order(
            vec![c.clone(), b.clone(), a.clone()],
            &FilterState::default(),
            SortColumn::FairFight,
            true,
            None,
        );
        assert_eq!(
            asc.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        // Descending reverses the comparison, so the missing row floats
        // to the top.
        let desc = display_order(
            vec![c, b, a],
            &FilterState::default(),
            SortColumn::FairFight,
            false,
            None,
        );
        assert_eq!(desc.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn test_filters_or_within_and_across() {
        let online_okay = row(1, member("A", "Okay", "Online"));
        let idle_okay = row(2, member("B", "Okay", "Idle"));
        let online_hospital = row(3, member("C", "Hospital", "Online"));

        let mut filters = FilterState::default();
        filters.online_status.insert(OnlineStatus::Online);
        filters.online_status.insert(OnlineStatus::Idle);
        filters.state.insert(MemberState::Okay);

        assert!(filters.matches(&online_okay));
        assert!(filters.matches(&idle_okay));
        assert!(!filters.matches(&online_hospital));
    }

    #[test]
    fn test_ff_bucket_requires_stat() {
        let known = with_ff(row(1, member("A", "Okay", "Online")), 1.2);
        let unknown = row(2, member("B", "Okay", "Online"));

        let mut filters = FilterState::default();
        filters.ff.insert(FfBucket::Under2);

        assert!(filters.matches(&known));
        assert!(!filters.matches(&unknown));
    }

    #[test]
    fn test_empty_filters_pass_everything() {
        let filters = FilterState::default();
        assert!(filters.is_empty());
        assert!(filters.matches(&row(1, member("A", "Fallen", "Offline"))));
    }

    #[test]
    fn test_pinned_rows_float_first() {
        let mut pinned_row = row(5, member("Zed", "Abroad", "Offline"));
        pinned_row.pinned = true;
        let top = row(1, member("Alice", "Okay", "Online"));

        let ordered = display_order(
            vec![top, pinned_row],
            &FilterState::default(),
            SortColumn::Priority,
            true,
            None,
        );
        assert_eq!(ordered[0].id, 5);
        assert_eq!(ordered[1].id, 1);
    }

    #[test]
    fn test_enrich_joins_by_player_id() {
        let mut stats = HashMap::new();
        stats.insert(
            7,
            FfScouterData {
                player_id: 7,
                fair_fight: Some(2.5),
                bs_estimate: Some(12_000_000),
                bs_estimate_human: Some("12m".to_string()),
                bss_public: None,
                last_updated: None,
            },
        );
        let mut pinned = HashSet::new();
        pinned.insert(8);

        let rows = enrich(
            vec![(7, member("A", "Okay", "Online")), (8, member("B", "Okay", "Idle"))],
            &stats,
            &pinned,
        );

        assert!(rows[0].ffs.is_some());
        assert!(!rows[0].pinned);
        assert!(rows[1].ffs.is_none());
        assert!(rows[1].pinned);
    }

    #[test]
    fn test_filter_state_round_trips_through_json() {
        let mut filters = FilterState::default();
        filters.state.insert(MemberState::Hospital);
        filters.ff.insert(FfBucket::Under4);

        let json = serde_json::to_string(&filters).unwrap();
        let back: FilterState = serde_json::from_str(&json).unwrap();
        assert_eq!(filters, back);
    }
}
