use std::collections::HashSet;
use std::sync::Arc;

use agile_map::attributes::{IterationLabelMode, IterationLabels, LinkShape, LinkTrail};
use agile_map::config::LayoutConfig;
use agile_map::forest::build_results;
use agile_map::host::{MemoryHost, RenderHost, UnavailableHost};
use agile_map::models::*;
use agile_map::session::{Dataset, LayoutError, LayoutReport, LayoutSession};
use agile_map::status::StatusBoard;
use chrono::{TimeZone, Utc};
use speculate2::speculate;

fn item(
    id: &str,
    kind: WorkItemType,
    state: WorkItemState,
    parent: Option<&str>,
    children: &[&str],
) -> WorkItem {
    WorkItem {
        id: id.to_string(),
        parent: parent.map(str::to_string),
        name: format!("Item {}", id),
        kind,
        state,
        iteration: Some("Sprint 1".to_string()),
        remote_ref: None,
        children: children.iter().map(|c| c.to_string()).collect(),
    }
}

/// Epic "1" with stories "2" and "3".
fn epic_with_stories() -> Dataset {
    Dataset::new(build_results(vec![
        item("1", WorkItemType::Epic, WorkItemState::InProgress, None, &["2", "3"]),
        item("2", WorkItemType::Story, WorkItemState::InProgress, Some("1"), &[]),
        item("3", WorkItemType::Story, WorkItemState::Backlog, Some("1"), &[]),
    ]))
}

fn session(host: &MemoryHost, dataset: Dataset) -> LayoutSession {
    LayoutSession::new(Arc::new(host.clone()), dataset, LayoutConfig::default())
}

fn run(session: &mut LayoutSession, status: &mut StatusBoard) -> LayoutReport {
    tokio_test::block_on(session.run(status)).expect("Layout pass failed")
}

fn x_of(host: &MemoryHost, id: &str) -> f64 {
    host.node_for(id).expect("Node not drawn").location.x
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Link endpoints as external id pairs.
fn link_pairs(host: &MemoryHost) -> HashSet<(String, String)> {
    let by_uuid = |uuid: &str| {
        host.nodes()
            .into_iter()
            .find(|n| n.uuid.as_deref() == Some(uuid))
            .map(|n| n.notes)
            .expect("Link endpoint without node")
    };
    host.links()
        .iter()
        .map(|l| (by_uuid(&l.from_uuid), by_uuid(&l.to_uuid)))
        .collect()
}

speculate! {
    before {
        let host = MemoryHost::default();
        let mut status = StatusBoard::new();
    }

    describe "an epic with two stories" {
        it "spaces the stories symmetrically and centres the epic" {
            let mut session = session(&host, epic_with_stories());
            let report = run(&mut session, &mut status);

            assert_eq!(report.nodes_created, 3);
            assert!(approx(x_of(&host, "2"), -0.15));
            assert!(approx(x_of(&host, "3"), 0.15));
            assert!(approx(x_of(&host, "1"), 0.0));
        }

        it "draws deeper levels lower, on the map plane" {
            let mut session = session(&host, epic_with_stories());
            run(&mut session, &mut status);

            let epic = host.node_for("1").unwrap();
            let story = host.node_for("2").unwrap();
            assert!(approx(epic.location.y, 0.0));
            assert!(approx(story.location.y, -0.42));
            assert!(approx(story.location.z, -0.3));
        }

        it "draws one edge per parent and child" {
            let mut session = session(&host, epic_with_stories());
            let report = run(&mut session, &mut status);

            assert_eq!(report.links_created, 2);
            let expected: HashSet<_> = [("1", "2"), ("1", "3")]
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect();
            assert_eq!(link_pairs(&host), expected);
        }

        it "styles edges by the child's state" {
            let mut session = session(&host, epic_with_stories());
            run(&mut session, &mut status);

            let active = host.node_for("2").unwrap().uuid;
            for link in host.links() {
                if Some(&link.to_uuid) == active.as_ref() {
                    assert_eq!(link.shape, LinkShape::Arrows);
                    assert_eq!(link.trail, LinkTrail::Cone);
                    assert_eq!(link.size, 2.0);
                } else {
                    assert_eq!(link.shape, LinkShape::Solid);
                    assert_eq!(link.trail, LinkTrail::None);
                    assert_eq!(link.size, 1.0);
                }
            }
        }

        it "reports the final positions" {
            let mut session = session(&host, epic_with_stories());
            let report = run(&mut session, &mut status);

            assert_eq!(report.positions.len(), 3);
            assert!(approx(report.positions["3"].x, 0.15));
        }
    }

    describe "placeholders" {
        it "reserve space without drawing nodes" {
            // "3" is a leaf one level above "4", so it gets a placeholder child.
            let dataset = Dataset::new(build_results(vec![
                item("1", WorkItemType::Epic, WorkItemState::Backlog, None, &["2", "3"]),
                item("2", WorkItemType::Feature, WorkItemState::Backlog, Some("1"), &["4"]),
                item("3", WorkItemType::Feature, WorkItemState::Backlog, Some("1"), &[]),
                item("4", WorkItemType::Story, WorkItemState::Backlog, Some("2"), &[]),
            ]));
            let mut session = session(&host, dataset);
            let report = run(&mut session, &mut status);

            assert_eq!(report.placeholders, 1);
            assert_eq!(host.nodes().len(), 4);
            assert!(host.nodes().iter().all(|n| !n.notes.starts_with('P')));

            assert!(approx(x_of(&host, "4"), -0.15));
            assert!(approx(x_of(&host, "2"), -0.15));
            assert!(approx(x_of(&host, "3"), 0.15));
            assert!(approx(x_of(&host, "1"), 0.0));
        }

        it "keep a short leaf over the column its chain reserves" {
            // "5" sits two levels above the deepest items, so it gets pads at levels 2 and 3.
            // Level 3 holds 4, 7, the pad under 6 and the deepest pad under 5.
            let dataset = Dataset::new(build_results(vec![
                item("1", WorkItemType::Epic, WorkItemState::Backlog, None, &["2", "5"]),
                item("2", WorkItemType::Feature, WorkItemState::Backlog, Some("1"), &["3", "6"]),
                item("3", WorkItemType::Story, WorkItemState::Backlog, Some("2"), &["4", "7"]),
                item("4", WorkItemType::Task, WorkItemState::Backlog, Some("3"), &[]),
                item("5", WorkItemType::Feature, WorkItemState::Backlog, Some("1"), &[]),
                item("6", WorkItemType::Story, WorkItemState::Backlog, Some("2"), &[]),
                item("7", WorkItemType::Task, WorkItemState::Backlog, Some("3"), &[]),
            ]));
            let mut session = session(&host, dataset);
            let report = run(&mut session, &mut status);

            assert_eq!(report.placeholders, 3);
            assert!(approx(x_of(&host, "4"), -0.45));
            assert!(approx(x_of(&host, "7"), -0.15));
            assert!(approx(x_of(&host, "6"), 0.15));
            assert!(approx(x_of(&host, "5"), 0.45));
            assert!(approx(x_of(&host, "3"), -0.3));
            assert!(approx(x_of(&host, "2"), -0.075));
        }
    }

    describe "repeated passes" {
        it "updates nodes drawn by an earlier pass" {
            run(&mut session(&host, epic_with_stories()), &mut status);
            let report = run(&mut session(&host, epic_with_stories()), &mut status);

            assert_eq!(report.nodes_created, 0);
            assert_eq!(report.nodes_updated, 3);
            assert_eq!(host.nodes().len(), 3);
        }

        it "rebuilds the same edges" {
            run(&mut session(&host, epic_with_stories()), &mut status);
            let first = link_pairs(&host);

            let report = run(&mut session(&host, epic_with_stories()), &mut status);
            assert_eq!(report.links_deleted, 2);
            assert_eq!(host.links().len(), 2);
            assert_eq!(link_pairs(&host), first);
        }

        it "creates a node again when the host lost it" {
            run(&mut session(&host, epic_with_stories()), &mut status);
            tokio_test::block_on(host.clear_map()).unwrap();

            let report = run(&mut session(&host, epic_with_stories()), &mut status);
            assert_eq!(report.nodes_created, 3);
        }

        it "reports rejected updates as updates" {
            run(&mut session(&host, epic_with_stories()), &mut status);
            host.fail_nodes_for("2");

            let report = run(&mut session(&host, epic_with_stories()), &mut status);
            assert_eq!(report.nodes_updated, 2);
            assert_eq!(report.failures.len(), 1);
            assert!(report.failures[0].starts_with("Node update error"));
        }
    }

    describe "identity registration" {
        it "maps a newly drawn item to its host id" {
            let dataset = Dataset::new(build_results(vec![
                item("42", WorkItemType::Task, WorkItemState::Backlog, None, &[]),
            ]));
            let mut session = session(&host, dataset);
            run(&mut session, &mut status);

            let uuid = host.node_for("42").unwrap().uuid.unwrap();
            assert_eq!(session.registry().visual_id("42"), Some(uuid.as_str()));
            assert_eq!(session.registry().external_id(&uuid), Some("42"));
        }
    }

    describe "failures" {
        it "abort the pass when the forest names an unknown item" {
            let dataset = Dataset::new(WorkItemResults {
                work_items: vec![],
                work_paths: vec![PathNode::new("99", vec![])],
            });
            let mut session = session(&host, dataset);
            let result = tokio_test::block_on(session.run(&mut status));

            match result {
                Err(LayoutError::MissingWorkItem { id, depth }) => {
                    assert_eq!(id, "99");
                    assert_eq!(depth, 0);
                }
                other => panic!("Expected missing item error, got {:?}", other.map(|r| r.nodes_created)),
            }
        }

        it "do not stop the batch when one node is rejected" {
            host.fail_nodes_for("2");
            let mut session = session(&host, epic_with_stories());
            let report = run(&mut session, &mut status);

            assert_eq!(report.failures.len(), 1);
            assert!(status.is_error());
            assert!(host.node_for("1").is_some());
            assert!(host.node_for("3").is_some());
            assert_eq!(report.links_created, 1);
            assert_eq!(report.links_skipped, 1);
        }

        it "are reported per link" {
            host.fail_link_creation();
            let mut session = session(&host, epic_with_stories());
            let report = run(&mut session, &mut status);

            assert_eq!(host.nodes().len(), 3);
            assert_eq!(report.links_created, 0);
            assert_eq!(report.failures.len(), 2);
        }

        it "skip links to children outside the snapshot" {
            let dataset = Dataset::new(build_results(vec![
                item("1", WorkItemType::Epic, WorkItemState::Backlog, None, &["2", "77"]),
                item("2", WorkItemType::Story, WorkItemState::Backlog, Some("1"), &[]),
            ]));
            let mut session = session(&host, dataset);
            let report = run(&mut session, &mut status);

            assert_eq!(report.links_created, 1);
            assert_eq!(report.links_skipped, 1);
            assert!(status.events().any(|e| e.contains("77")));
        }

        it "are all reported when the host is unavailable" {
            let mut session = LayoutSession::new(
                Arc::new(UnavailableHost),
                epic_with_stories(),
                LayoutConfig::default(),
            );
            let report = run(&mut session, &mut status);

            assert_eq!(report.nodes_created, 0);
            // list nodes, three creates, list links
            assert_eq!(report.failures.len(), 5);
            assert!(status.is_error());
        }
    }

    describe "iteration labels" {
        it "pass names through by default" {
            let mut session = session(&host, epic_with_stories());
            run(&mut session, &mut status);

            assert!(host.links().iter().all(|l| l.title == "Sprint 1"));
        }

        it "show start dates when configured" {
            let iterations = vec![Iteration {
                name: "Sprint 1".to_string(),
                start: Some(Utc.with_ymd_and_hms(2021, 2, 15, 0, 0, 0).unwrap()),
                end: None,
            }];
            let labels = IterationLabels::with_catalog(IterationLabelMode::StartDate, &iterations);
            let mut session = LayoutSession::with_labels(
                Arc::new(host.clone()),
                epic_with_stories(),
                LayoutConfig::default(),
                labels,
            );
            run(&mut session, &mut status);

            assert!(host.links().iter().all(|l| l.title == "02/15"));
        }
    }

    describe "spacing" {
        it "follows the configured offsets" {
            let config = LayoutConfig {
                x_spacing: 1.0,
                y_spacing: 2.0,
                ..LayoutConfig::default()
            };
            let mut session = LayoutSession::new(Arc::new(host.clone()), epic_with_stories(), config);
            run(&mut session, &mut status);

            assert!(approx(x_of(&host, "2"), -0.5));
            assert!(approx(x_of(&host, "3"), 0.5));
            assert!(approx(host.node_for("3").unwrap().location.y, -2.0));
        }
    }
}
