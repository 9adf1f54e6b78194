use kube::CustomResourceExt;
use ragme_operator::domain::stack::entities::RAGme;

fn main() -> Result<(), anyhow::Error> {
    print!("{}", serde_yaml::to_string(&RAGme::crd())?);
    Ok(())
}
