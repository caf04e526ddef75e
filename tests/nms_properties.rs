use detbox::{iou, nms, nms_by, nms_with_scratch, BoundingBox, Detection, NmsScratch};

/// One wide dominant box crossed by four vertical strips. Every strip
/// overlaps the dominant box with a different ratio, while the strips
/// themselves at most touch, so the dominant box is the only suppressor and
/// the kept count can only grow as the threshold rises.
fn star_cluster(ox: f32, oy: f32, score: f32) -> Vec<Detection> {
    let mut out = vec![Detection::new(ox, oy, ox + 99.0, oy + 9.0, score)];
    let strips: [(f32, f32); 4] = [(0.0, 4.0), (5.0, 19.0), (20.0, 49.0), (50.0, 94.0)];
    for (k, (x0, x1)) in strips.iter().enumerate() {
        out.push(Detection::new(
            ox + x0,
            oy - 5.0,
            ox + x1,
            oy + 14.0,
            score - 0.05 * (k as f32 + 1.0),
        ));
    }
    out
}

#[test]
fn kept_count_grows_with_threshold_on_star_clusters() {
    let mut dets = star_cluster(0.0, 0.0, 0.95);
    dets.extend(star_cluster(1000.0, 1000.0, 0.5));

    // Strip overlaps with the dominant box are roughly .048, .130, .231, .310.
    let thresholds = [0.01, 0.1, 0.2, 0.28, 0.5];
    let expected = [2, 4, 6, 8, 10];

    let mut previous = 0usize;
    for (threshold, want) in thresholds.iter().zip(expected.iter()) {
        let kept = nms(&dets, *threshold).unwrap();
        assert_eq!(kept.len(), *want);
        assert!(kept.len() >= previous);
        previous = kept.len();
    }
}

#[test]
fn rerunning_on_survivors_is_identity() {
    let mut dets = star_cluster(0.0, 0.0, 0.95);
    dets.extend(star_cluster(40.0, 200.0, 0.6));
    let threshold = 0.15;

    let kept = nms(&dets, threshold).unwrap();
    let survivors: Vec<Detection> = kept.iter().map(|&i| dets[i]).collect();

    let again = nms(&survivors, threshold).unwrap();
    assert_eq!(again, (0..survivors.len()).collect::<Vec<_>>());
}

#[test]
fn single_candidate_is_always_kept() {
    let dets = [Detection::new(3.0, 4.0, 20.0, 30.0, 0.1)];
    for threshold in [0.0, 0.3, 0.9, 1.0] {
        assert_eq!(nms(&dets, threshold).unwrap(), vec![0]);
    }
}

#[test]
fn duplicate_boxes_keep_single_survivor() {
    let dets = [
        Detection::new(10.0, 10.0, 30.0, 30.0, 0.7),
        Detection::new(10.0, 10.0, 30.0, 30.0, 0.9),
        Detection::new(10.0, 10.0, 30.0, 30.0, 0.8),
    ];
    assert_eq!(nms(&dets, 0.99).unwrap(), vec![1]);
}

#[test]
fn equal_scores_keep_lowest_index_first() {
    let dets = [
        Detection::new(10.0, 10.0, 30.0, 30.0, 0.8),
        Detection::new(10.0, 10.0, 30.0, 30.0, 0.8),
        Detection::new(100.0, 100.0, 120.0, 120.0, 0.8),
    ];
    assert_eq!(nms(&dets, 0.5).unwrap(), vec![0, 2]);
}

#[test]
fn disjoint_candidates_all_survive_in_score_order() {
    let dets = [
        Detection::new(0.0, 0.0, 9.0, 9.0, 0.2),
        Detection::new(100.0, 0.0, 109.0, 9.0, 0.9),
        Detection::new(200.0, 0.0, 209.0, 9.0, 0.5),
    ];
    assert_eq!(nms(&dets, 0.1).unwrap(), vec![1, 2, 0]);
}

#[test]
fn overlapping_pair_collapses_far_box_survives() {
    let rows = [
        0.0, 0.0, 10.0, 10.0, 0.9, //
        1.0, 1.0, 11.0, 11.0, 0.8, //
        50.0, 50.0, 60.0, 60.0, 0.7,
    ];
    let dets = Detection::parse_rows(&rows).unwrap();
    assert_eq!(nms(&dets, 0.5).unwrap(), vec![0, 2]);
}

#[test]
fn degenerate_candidates_never_suppress_anything() {
    let dets = [
        Detection::new(0.0, 0.0, 10.0, 10.0, 0.5),
        Detection::new(30.0, 10.0, 5.0, 20.0, 0.9),
        Detection::new(1.0, 1.0, 11.0, 11.0, 0.4),
    ];
    // The degenerate box scores highest but overlaps nothing, so the two
    // real boxes still fight it out between themselves.
    assert_eq!(nms(&dets, 0.5).unwrap(), vec![1, 0]);
}

#[test]
fn nan_scores_order_deterministically() {
    let dets = [
        Detection::new(0.0, 0.0, 9.0, 9.0, 0.8),
        Detection::new(100.0, 100.0, 109.0, 109.0, f32::NAN),
    ];
    // total_cmp places a positive NaN above every finite score.
    let kept = nms(&dets, 0.5).unwrap();
    assert_eq!(kept, vec![1, 0]);
    assert_eq!(nms(&dets, 0.5).unwrap(), kept);
}

#[test]
fn out_of_range_thresholds_stay_well_defined() {
    let dets = [
        Detection::new(0.0, 0.0, 10.0, 10.0, 0.9),
        Detection::new(0.0, 0.0, 10.0, 10.0, 0.8),
        Detection::new(500.0, 500.0, 510.0, 510.0, 0.7),
    ];
    // Above one nothing exceeds the threshold strictly, so all survive.
    assert_eq!(nms(&dets, 1.5).unwrap(), vec![0, 1, 2]);
    // Below zero even a zero overlap exceeds the threshold, so the first
    // survivor suppresses everything else.
    assert_eq!(nms(&dets, -1.0).unwrap(), vec![0]);
    // A NaN threshold never compares greater, so all survive.
    assert_eq!(nms(&dets, f32::NAN).unwrap(), vec![0, 1, 2]);
}

#[test]
fn custom_metric_reproduces_builtin_iou() {
    let mut dets = star_cluster(0.0, 0.0, 0.95);
    dets.extend(star_cluster(300.0, -50.0, 0.7));
    for threshold in [0.05, 0.2, 0.4] {
        assert_eq!(
            nms_by(&dets, threshold, iou).unwrap(),
            nms(&dets, threshold).unwrap()
        );
    }
}

#[test]
fn custom_metric_can_change_survivors() {
    // Containment metric: intersection over the smaller area.
    let containment = |a: BoundingBox, b: BoundingBox| -> f32 {
        let iw = (a.x2.min(b.x2) - a.x1.max(b.x1) + 1.0).max(0.0);
        let ih = (a.y2.min(b.y2) - a.y1.max(b.y1) + 1.0).max(0.0);
        (iw * ih) / a.area().min(b.area())
    };

    let dets = [
        Detection::new(0.0, 0.0, 99.0, 99.0, 0.9),
        Detection::new(10.0, 10.0, 19.0, 19.0, 0.8),
    ];
    // The nested box survives under IoU but not under containment.
    assert_eq!(nms(&dets, 0.5).unwrap(), vec![0, 1]);
    assert_eq!(nms_by(&dets, 0.5, containment).unwrap(), vec![0]);
}

#[test]
fn scratch_and_allocating_entries_agree() {
    let mut dets = star_cluster(0.0, 0.0, 0.9);
    dets.extend(star_cluster(500.0, 500.0, 0.8));
    let mut scratch = NmsScratch::for_len(dets.len()).unwrap();

    for threshold in [0.05, 0.25, 0.45] {
        let borrowed = nms_with_scratch(&dets, threshold, &mut scratch)
            .unwrap()
            .to_vec();
        assert_eq!(borrowed, nms(&dets, threshold).unwrap());
    }
}
