mod common;

use std::sync::Arc;

use nalgebra::DMatrix;
use ttim_element::{
    AquiferData, AquiferLookup, BcKind, ElementConfig, ElementError, LayerSelection, Model,
    ModelConfig, UniformAquifer,
};

use common::{IdentityInverse, UnitKernel, c, single_layer_model};

#[test]
fn duplicate_label_is_rejected_without_registering() {
    let mut model = single_layer_model(0.0, 10.0);
    let config = ElementConfig::new("Well", BcKind::Given).with_label("w1");
    model.add_element(config.clone(), UnitKernel::boxed(1)).unwrap();
    assert!(matches!(
        model.add_element(config, UnitKernel::boxed(1)),
        Err(ElementError::LabelExists(label)) if label == "w1"
    ));
    assert_eq!(model.elements().len(), 1);
    assert!(model.element_by_label("w1").is_some());
}

#[test]
fn malformed_history_is_rejected_without_registering() {
    let mut model = single_layer_model(0.0, 10.0);
    let mut config = ElementConfig::new("Well", BcKind::Given).with_label("w1");
    config.tsandbc = vec![vec![0.0, 1.0, 2.0]];
    assert!(matches!(
        model.add_element(config, UnitKernel::boxed(1)),
        Err(ElementError::InputShape { row: 0, columns: 3 })
    ));
    assert!(model.elements().is_empty());
    assert!(model.element_by_label("w1").is_none());
}

#[test]
fn history_is_shifted_by_model_start() {
    let mut model = Model::new(
        common::settings(0.0, 10.0, 5.0),
        vec![c(1.0)],
        Arc::new(UniformAquifer::new(AquiferData::identity(1, 1).unwrap())),
        Box::new(IdentityInverse),
    );
    let well = model
        .add_element(
            ElementConfig::new("Well", BcKind::Given).with_tsandbc(&[(7.0, 2.0)]),
            UnitKernel::boxed(1),
        )
        .unwrap();
    let history = model.element(well).unwrap().history().unwrap();
    assert_eq!(history.tstart(), &[0.0, 2.0]);
    assert_eq!(history.increments(), &[0.0, 2.0]);
}

#[test]
fn parameters_need_one_set_per_history_element() {
    let mut model = single_layer_model(0.0, 10.0);
    model
        .add_element(ElementConfig::new("Well", BcKind::Given), UnitKernel::boxed(1))
        .unwrap();
    let head = model
        .add_element(ElementConfig::new("HeadWell", BcKind::Variable), UnitKernel::boxed(1))
        .unwrap();

    // one set for the given well and one for the head well itself
    let two = || vec![DMatrix::from_element(1, 1, c(1.0)); 2];
    assert!(matches!(
        model.set_parameters(head, two()),
        Err(ElementError::NotInitialized(_))
    ));
    model.initialize().unwrap();
    assert_eq!(model.gvbclist(), &[0, 1]);
    assert!(matches!(
        model.set_parameters(head, vec![DMatrix::from_element(1, 1, c(1.0))]),
        Err(ElementError::ShapeMismatch { expected: 2, found: 1, .. })
    ));
    model.set_parameters(head, two()).unwrap();
    assert!(matches!(
        model.set_parameters(head, two()),
        Err(ElementError::AlreadySolved(_))
    ));
}

#[test]
fn given_element_needs_one_parameter_per_layer() {
    let lookup: Arc<dyn AquiferLookup> = Arc::new(UniformAquifer::new(AquiferData::identity(2, 1).unwrap()));
    let mut model = Model::new(
        common::settings(0.0, 10.0, 0.0),
        vec![c(1.0)],
        lookup,
        Box::new(IdentityInverse),
    );
    let config = ElementConfig::new("Well", BcKind::Given)
        .with_layers(vec![0, 1])
        .with_nparam(1, 0);
    model.add_element(config, UnitKernel::boxed(1)).unwrap();
    assert!(matches!(
        model.initialize(),
        Err(ElementError::ShapeMismatch { .. })
    ));
}

#[test]
fn element_layers_must_exist_in_the_aquifer() {
    let mut model = single_layer_model(0.0, 10.0);
    let config = ElementConfig::new("Well", BcKind::Zero).with_layers(vec![3]);
    model.add_element(config, UnitKernel::boxed(1)).unwrap();
    assert!(matches!(
        model.initialize(),
        Err(ElementError::LayerOutOfRange { layer: 3, naq: 1 })
    ));
}

#[test]
fn spatial_queries_after_solve() {
    let mut model = single_layer_model(0.0, 10.0);
    model
        .add_element(ElementConfig::new("Well", BcKind::Given), UnitKernel::boxed(1))
        .unwrap();
    let head = model
        .add_element(ElementConfig::new("HeadWell", BcKind::Variable), UnitKernel::boxed(1))
        .unwrap();
    model.initialize().unwrap();
    model
        .set_parameters(
            head,
            vec![DMatrix::from_element(1, 1, c(4.0)), DMatrix::from_element(1, 1, c(0.0))],
        )
        .unwrap();

    let element = model.element(head).unwrap();
    let pot = element.potential(5.0, 5.0, None).unwrap();
    assert_eq!(pot[0][(0, 0)], c(4.0));
    let phi = element
        .potentiallayers(5.0, 5.0, &LayerSelection::All, None)
        .unwrap();
    assert_eq!(phi[0][(0, 0)], c(4.0));
}

#[test]
fn model_from_toml_config() {
    let config = ModelConfig::from_toml_str(
        r#"
        [model]
        name = "ml"
        tmin = 0.0
        tmax = 10.0

        [[elements]]
        name = "Well"
        label = "w1"
        kind = "given"
        tsandbc = [[0.0, 1.0], [2.0, 3.0]]

        [[elements]]
        name = "HeadWell"
        label = "h1"
        kind = "variable"
        nunknowns = 1
        "#,
    )
    .unwrap();
    let mut model = Model::from_config(
        config,
        vec![c(1.0)],
        Arc::new(UniformAquifer::new(AquiferData::identity(1, 1).unwrap())),
        Box::new(IdentityInverse),
        |element| Ok(UnitKernel::boxed(element.nparam)),
    )
    .unwrap();
    model.initialize().unwrap();
    assert_eq!(model.ngvbc(), 2);

    let q = model.discharge(0, &[1.0, 3.0], 0).unwrap();
    assert_eq!(q[(0, 0)], 1.0);
    assert_eq!(q[(0, 1)], 3.0);

    let text = model.write();
    assert!(text.starts_with("Well(ml,\n"));
    assert!(text.contains("HeadWell(ml,\n"));
    assert!(text.contains("label = 'h1',\n"));
}

#[test]
fn initialize_runs_once() {
    let mut model = single_layer_model(0.0, 10.0);
    model
        .add_element(ElementConfig::new("Well", BcKind::Given), UnitKernel::boxed(1))
        .unwrap();
    model.initialize().unwrap();
    assert!(matches!(
        model.initialize(),
        Err(ElementError::AlreadyInitialized(_))
    ));
    assert!(matches!(
        model.add_element(ElementConfig::new("Well", BcKind::Given), UnitKernel::boxed(1)),
        Err(ElementError::AlreadyInitialized(_))
    ));
    assert_eq!(model.gvbclist(), &[0]);
}

#[test]
fn failed_initialize_leaves_gvbclist_empty() {
    let mut model = single_layer_model(0.0, 10.0);
    model
        .add_element(ElementConfig::new("Well", BcKind::Given), UnitKernel::boxed(1))
        .unwrap();
    model
        .add_element(
            ElementConfig::new("Well", BcKind::Zero).with_layers(vec![2]),
            UnitKernel::boxed(1),
        )
        .unwrap();
    assert!(model.initialize().is_err());
    assert!(model.gvbclist().is_empty());
    assert_eq!(model.ngvbc(), 0);
}
