extern crate std;

use super::*;

#[test]
fn single_sided_constructors_wire_the_other_edge_to_nop() {
    assert_eq!(KeyAssign::layer_push(1, 3).press, Action::LayerPush { id: 1, layer: 3 });
    assert_eq!(KeyAssign::layer_push(1, 3).release, Action::Nop);

    assert_eq!(KeyAssign::layer_pop(1).press, Action::LayerPop { id: 1 });
    assert_eq!(KeyAssign::layer_pop(1).release, Action::Nop);

    assert_eq!(KeyAssign::toggle(4).release, Action::Nop);
    assert_eq!(KeyAssign::capslock().release, Action::Nop);
    assert_eq!(KeyAssign::unicode(b"x").release, Action::Nop);
    assert_eq!(KeyAssign::bootloader().press, Action::Bootloader);
    assert_eq!(KeyAssign::bootloader().release, Action::Nop);
}

#[test]
fn layer_push_pop_pairs_push_and_pop_the_same_id() {
    let assign = KeyAssign::layer_push_pop(7, 2);
    assert_eq!(assign.press, Action::LayerPush { id: 7, layer: 2 });
    assert_eq!(assign.release, Action::LayerPop { id: 7 });
}

#[test]
fn out_of_range_layer_resolves_to_nop_pair() {
    static LAYERS: [[[KeyAssign; 1]; 1]; 1] = [[[KeyAssign::kc(4)]]];
    let layout = Layout::new(&LAYERS, &[]);

    assert_eq!(layout.get(0, 0, 0), KeyAssign::kc(4));
    assert_eq!(layout.get(9, 0, 0), KeyAssign::nop());
    assert!(layout.chord_spec(0).is_none());
}
