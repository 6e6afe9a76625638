//! Documents encoded the way the back end encodes them decode back to the
//! original tree.

use biblioteka_core::jsog::normalize;
use mock_server::jsog::encode;
use serde_json::json;

#[test]
fn shared_sub_object_at_two_paths() {
    let autor = json!({"id": 1, "nome": "Machado de Assis"});
    let tree = json!({
        "content": [
            {"id": 10, "titulo": "Dom Casmurro", "autor": autor},
            {"id": 11, "titulo": "Quincas Borba", "autor": autor}
        ],
        "destaque": {"autor": autor}
    });

    let encoded = encode(&tree);
    assert_eq!(encoded["content"][1]["autor"]["@ref"], encoded["content"][0]["autor"]["@id"]);
    assert_eq!(normalize(encoded).unwrap(), tree);
}

#[test]
fn repeated_whole_entries_and_empty_objects() {
    let colecao = json!({"id": 2, "nome": "atlas", "descricao": "mapas", "livros": []});
    let tree = json!([colecao, {}, colecao, {}, [colecao]]);

    assert_eq!(normalize(encode(&tree)).unwrap(), tree);
}

#[test]
fn nested_sharing_inside_shared_objects() {
    let editora = json!({"nome": "Garnier"});
    let livro = json!({"titulo": "Iracema", "editora": editora});
    let tree = json!({
        "a": {"livros": [livro, livro]},
        "b": {"editora": editora, "livro": livro}
    });

    assert_eq!(normalize(encode(&tree)).unwrap(), tree);
}

#[test]
fn scalars_survive_untouched() {
    let tree = json!({"total": 3, "ok": true, "nada": null, "nomes": ["a", "b"]});
    assert_eq!(normalize(encode(&tree)).unwrap(), tree);
}
