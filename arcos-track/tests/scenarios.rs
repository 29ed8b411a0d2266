//! End-to-end scenario tests for the tracking pipeline: the concrete cases
//! and boundary behaviors that a collective-event tracker must satisfy.

use arcos_track::{Column, ClusteringConfig, Raster, Table, track_events_dataframe, track_events_image};

fn dataframe_config(eps: f64, eps_prev: f64, min_cluster_size: usize, n_prev: usize) -> ClusteringConfig {
    ClusteringConfig::new("dbscan", eps)
        .with_eps_prev(eps_prev)
        .with_min_cluster_size(min_cluster_size)
        .with_n_prev(n_prev)
}

fn table_xy(frames: &[i64], xs: &[f64], ys: &[f64]) -> Table {
    Table::new()
        .with_column("frame", Column::I64(frames.to_vec()))
        .unwrap()
        .with_column("x", Column::F64(xs.to_vec()))
        .unwrap()
        .with_column("y", Column::F64(ys.to_vec()))
        .unwrap()
}

#[test]
fn single_stationary_cluster_three_frames() {
    let table = table_xy(
        &[0, 0, 1, 1, 2, 2],
        &[0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
    );
    let config = dataframe_config(1.5, 1.5, 2, 1);
    let result = track_events_dataframe(
        &table,
        &config,
        ["x".to_string(), "y".to_string()],
        "frame".to_string(),
        None,
        None,
        "clTrackID".to_string(),
    )
    .unwrap();

    let ids = result.column("clTrackID").unwrap().as_i64().unwrap();
    assert_eq!(ids, &[1, 1, 1, 1, 1, 1]);
}

#[test]
fn two_independent_clusters_mint_in_ascending_label_order() {
    let table = table_xy(
        &[0, 0, 0, 0, 1, 1, 1, 1],
        &[0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 10.0, 10.0],
        &[0.0, 1.0, 10.0, 11.0, 0.0, 1.0, 10.0, 11.0],
    );
    let config = dataframe_config(1.5, 1.5, 2, 1);
    let result = track_events_dataframe(
        &table,
        &config,
        ["x".to_string(), "y".to_string()],
        "frame".to_string(),
        None,
        None,
        "clTrackID".to_string(),
    )
    .unwrap();

    let ids = result.column("clTrackID").unwrap().as_i64().unwrap();
    assert_eq!(ids, &[1, 1, 2, 2, 1, 1, 2, 2]);
}

#[test]
fn drift_within_eps_prev_inherits_the_same_id() {
    let table = table_xy(&[0, 0, 1, 1], &[0.0, 0.0, 0.5, 0.5], &[0.0, 1.0, 0.5, 1.5]);
    let config = dataframe_config(1.5, 1.0, 2, 1);
    let result = track_events_dataframe(
        &table,
        &config,
        ["x".to_string(), "y".to_string()],
        "frame".to_string(),
        None,
        None,
        "clTrackID".to_string(),
    )
    .unwrap();

    let ids = result.column("clTrackID").unwrap().as_i64().unwrap();
    assert_eq!(ids, &[1, 1, 1, 1]);
}

#[test]
fn drift_beyond_eps_prev_mints_a_fresh_id() {
    let table = table_xy(&[0, 0, 1, 1], &[0.0, 0.0, 0.5, 0.5], &[0.0, 1.0, 0.5, 1.5]);
    let config = dataframe_config(1.5, 0.2, 2, 1);
    let result = track_events_dataframe(
        &table,
        &config,
        ["x".to_string(), "y".to_string()],
        "frame".to_string(),
        None,
        None,
        "clTrackID".to_string(),
    )
    .unwrap();

    let ids = result.column("clTrackID").unwrap().as_i64().unwrap();
    assert_eq!(ids, &[1, 1, 2, 2]);
}

#[test]
fn gap_exceeding_memory_depth_mints_a_fresh_id_after_an_empty_frame() {
    let table = table_xy(&[0, 0, 2, 2], &[0.0, 0.0, 0.0, 0.0], &[0.0, 1.0, 0.0, 1.0]);
    let config = dataframe_config(1.5, 1.5, 2, 1);
    let result = track_events_dataframe(
        &table,
        &config,
        ["x".to_string(), "y".to_string()],
        "frame".to_string(),
        None,
        None,
        "clTrackID".to_string(),
    )
    .unwrap();

    assert_eq!(result.len(), 4);
    let ids = result.column("clTrackID").unwrap().as_i64().unwrap();
    assert_eq!(ids, &[1, 1, 2, 2]);
}

#[test]
fn propagation_threshold_not_met_mints_fresh_instead_of_inheriting() {
    // Frame 0: a single point, minting id 1. Frame 1: a chain of three
    // points (density-connected under eps=1.5) forming one cluster, but
    // only the first is within epsPrev=0.5 of the single memory point.
    // With propagationThreshold=2, that one eligible neighbor is not
    // enough to inherit, so the whole cluster mints a fresh id.
    let table = table_xy(&[0, 1, 1, 1], &[0.0, 0.1, 1.0, 1.9], &[0.0, 0.0, 0.0, 0.0]);
    let config = dataframe_config(1.5, 0.5, 1, 1).with_propagation_threshold(2);
    let result = track_events_dataframe(
        &table,
        &config,
        ["x".to_string(), "y".to_string()],
        "frame".to_string(),
        None,
        None,
        "clTrackID".to_string(),
    )
    .unwrap();

    let ids = result.column("clTrackID").unwrap().as_i64().unwrap();
    assert_eq!(ids[0], 1);
    assert_eq!(&ids[1..], &[2, 2, 2]);
}

#[test]
fn singleton_cluster_with_min_cluster_size_one_is_produced() {
    let table = table_xy(&[0], &[0.0], &[0.0]);
    let config = dataframe_config(1.0, 1.0, 1, 1);
    let result = track_events_dataframe(
        &table,
        &config,
        ["x".to_string(), "y".to_string()],
        "frame".to_string(),
        None,
        None,
        "clTrackID".to_string(),
    )
    .unwrap();

    let ids = result.column("clTrackID").unwrap().as_i64().unwrap();
    assert_eq!(ids, &[1]);
}

#[test]
fn memory_drains_after_n_prev_empty_frames_but_ids_keep_climbing() {
    // frame 0 has a cluster (mints id 1), frames 1 and 2 are empty (nPrev=1
    // means memory is empty again by frame 2), frame 3 repeats the cluster
    // and must mint id 2, not reuse id 1.
    let table = table_xy(
        &[0, 0, 3, 3],
        &[0.0, 0.0, 0.0, 0.0],
        &[0.0, 1.0, 0.0, 1.0],
    );
    let config = dataframe_config(1.5, 1.5, 2, 1);
    let result = track_events_dataframe(
        &table,
        &config,
        ["x".to_string(), "y".to_string()],
        "frame".to_string(),
        None,
        None,
        "clTrackID".to_string(),
    )
    .unwrap();

    let ids = result.column("clTrackID").unwrap().as_i64().unwrap();
    assert_eq!(ids, &[1, 1, 2, 2]);
}

#[test]
fn raster_round_trip_diagonal_drift() {
    // 3 frames of a 4x4 image, a single active voxel drifting diagonally.
    let shape = vec![3, 4, 4];
    let mut data = vec![0i64; 3 * 4 * 4];
    data[0] = 1;
    data[1 * 16 + 1 * 4 + 1] = 1;
    data[2 * 16 + 2 * 4 + 2] = 1;
    let raster = Raster::new(shape.clone(), data);

    let config = dataframe_config(1.5, 1.5, 1, 1);
    let result = track_events_image::<2>(&raster, "TXY", &config).unwrap();
    assert_eq!(result.shape, shape);
    assert!(result.data.iter().all(|&v| v == 0 || v == 1));
    assert_eq!(result.data.iter().filter(|&&v| v == 1).count(), 3);
}

#[test]
fn raster_round_trip_with_eps_prev_zero_mints_a_new_id_every_frame() {
    let shape = vec![3, 4, 4];
    let mut data = vec![0i64; 3 * 4 * 4];
    data[0] = 1;
    data[1 * 16 + 1 * 4 + 1] = 1;
    data[2 * 16 + 2 * 4 + 2] = 1;
    let raster = Raster::new(shape.clone(), data);

    let config = dataframe_config(1.5, 0.0, 1, 1);
    let result = track_events_image::<2>(&raster, "TXY", &config).unwrap();
    assert_eq!(result.data[0], 1);
    assert_eq!(result.data[1 * 16 + 1 * 4 + 1], 2);
    assert_eq!(result.data[2 * 16 + 2 * 4 + 2], 3);
}
